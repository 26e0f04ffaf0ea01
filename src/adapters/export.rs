use crate::core::validator;
use crate::domain::model::{InstallmentRow, Money};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unsupported format '{}'; valid formats: table, csv, json",
                other
            )),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    label: &'a str,
    sequence: u32,
    amount: i64,
    due_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Schedule<'a> {
    target: Money,
    sum: Money,
    diff: Money,
    rows: &'a [InstallmentRow],
}

pub fn render(
    rows: &[InstallmentRow],
    target: Money,
    format: OutputFormat,
    separator: char,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows, target, separator)),
        OutputFormat::Csv => render_csv(rows),
        OutputFormat::Json => {
            let schedule = Schedule {
                target,
                sum: validator::sum(rows),
                diff: validator::diff(rows, target),
                rows,
            };
            Ok(serde_json::to_string_pretty(&schedule)?)
        }
    }
}

fn render_csv(rows: &[InstallmentRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(CsvRow {
            id: &row.id,
            label: &row.label,
            sequence: row.sequence,
            amount: row.amount.units(),
            due_date: row.due_date.map(|d| d.to_string()).unwrap_or_default(),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_table(rows: &[InstallmentRow], target: Money, sep: char) -> String {
    let amounts: Vec<String> = rows.iter().map(|r| r.amount.format_grouped(sep)).collect();
    let label_width = rows
        .iter()
        .map(|r| r.label.len())
        .chain(std::iter::once("Payment".len()))
        .max()
        .unwrap_or(0);
    let amount_width = amounts
        .iter()
        .map(String::len)
        .chain(std::iter::once("Amount".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<lw$}  {:>aw$}  Due Date",
        "Payment",
        "Amount",
        lw = label_width,
        aw = amount_width
    );
    for (row, amount) in rows.iter().zip(&amounts) {
        let due = row
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<lw$}  {:>aw$}  {}",
            row.label,
            amount,
            due,
            lw = label_width,
            aw = amount_width
        );
    }

    let _ = writeln!(
        out,
        "\nAmount: {}  Total: {}  Diff: {}",
        target.format_grouped(sep),
        validator::sum(rows).format_grouped(sep),
        validator::diff(rows, target).format_grouped(sep)
    );
    out
}
