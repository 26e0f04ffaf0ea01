use crate::domain::model::{InstallmentRow, RowEdit};
use std::collections::HashMap;

/// Apply draft edits to rows by id and return the rows in their original order.
///
/// Unknown ids are ignored. Amounts are not checked here; a plan may pass
/// through invalid states while the user is still typing.
pub fn apply_edits(
    rows: &[InstallmentRow],
    edits: &HashMap<String, RowEdit>,
) -> Vec<InstallmentRow> {
    let mut by_id: HashMap<&str, InstallmentRow> = rows
        .iter()
        .map(|row| (row.id.as_str(), row.clone()))
        .collect();

    for (id, edit) in edits {
        let Some(row) = by_id.get_mut(id.as_str()) else {
            tracing::debug!("Ignoring edit for unknown row {}", id);
            continue;
        };
        if let Some(amount) = edit.amount {
            row.amount = amount;
        }
        if let Some(due_date) = edit.due_date {
            row.due_date = Some(due_date);
        }
    }

    rows.iter()
        .filter_map(|row| by_id.remove(row.id.as_str()))
        .collect()
}
