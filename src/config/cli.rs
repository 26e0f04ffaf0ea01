use crate::adapters::export::OutputFormat;
use crate::domain::model::{ChannelId, Money, PlanShape, RowEdit, Tenor};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "payment-plan")]
#[command(about = "Generate, adjust and commit installment payment plans")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the generated schedule
    Preview {
        #[command(flatten)]
        plan: PlanArgs,

        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Validate the schedule and send it to the payment gateway
    Commit {
        #[command(flatten)]
        plan: PlanArgs,

        /// Host record the payments belong to
        #[arg(long)]
        record_id: String,

        /// Payment channel reference
        #[arg(long)]
        channel: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Target total in minor currency units
    #[arg(long, value_parser = parse_money)]
    pub total: Money,

    /// Number of installments (2, 4, 8 or 12); omit for a full payment
    #[arg(long, value_parser = parse_tenor)]
    pub tenor: Option<Tenor>,

    /// Date due dates are counted from (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Row override, ID=AMOUNT, ID=@DATE or ID=AMOUNT@DATE
    #[arg(long = "edit", value_parser = parse_edit)]
    pub edits: Vec<(String, RowEdit)>,
}

impl PlanArgs {
    pub fn shape(&self) -> PlanShape {
        match self.tenor {
            Some(tenor) => PlanShape::installment(tenor),
            None => PlanShape::Full,
        }
    }

    /// Repeated edits for the same row merge field by field; later values win.
    pub fn edit_map(&self) -> HashMap<String, RowEdit> {
        let mut merged: HashMap<String, RowEdit> = HashMap::new();
        for (id, edit) in &self.edits {
            let entry = merged.entry(id.clone()).or_default();
            if edit.amount.is_some() {
                entry.amount = edit.amount;
            }
            if edit.due_date.is_some() {
                entry.due_date = edit.due_date;
            }
        }
        merged
    }
}

impl Command {
    pub fn plan(&self) -> &PlanArgs {
        match self {
            Command::Preview { plan, .. } | Command::Commit { plan, .. } => plan,
        }
    }

    pub fn channel(&self) -> Option<ChannelId> {
        match self {
            Command::Commit {
                channel: Some(channel),
                ..
            } => Some(ChannelId::new(channel.clone())),
            _ => None,
        }
    }
}

pub fn parse_money(s: &str) -> Result<Money, String> {
    s.replace('_', "")
        .parse::<i64>()
        .map(Money::new)
        .map_err(|e| format!("invalid amount '{}': {}", s, e))
}

pub fn parse_tenor(s: &str) -> Result<Tenor, String> {
    let count = s
        .trim_end_matches('x')
        .parse::<u32>()
        .map_err(|e| format!("invalid tenor '{}': {}", s, e))?;
    Tenor::try_from(count)
}

pub fn parse_edit(s: &str) -> Result<(String, RowEdit), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=AMOUNT[@DATE], got '{}'", s))?;
    if id.trim().is_empty() {
        return Err(format!("missing row id in '{}'", s));
    }

    let (amount, due_date) = match value.split_once('@') {
        Some((amount, date)) => (amount, Some(date)),
        None => (value, None),
    };

    let amount = match amount.trim() {
        "" => None,
        raw => Some(parse_money(raw)?),
    };
    let due_date = due_date
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{}': {}", d, e))
        })
        .transpose()?;

    if amount.is_none() && due_date.is_none() {
        return Err(format!("edit '{}' changes nothing", s));
    }

    Ok((id.trim().to_string(), RowEdit { amount, due_date }))
}
