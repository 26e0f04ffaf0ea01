use crate::domain::model::{InstallmentRow, Money};
use crate::utils::error::ValidationError;

/// Row total, clamped to the `Money` range.
pub fn sum(rows: &[InstallmentRow]) -> Money {
    Money::saturating_from_wide(exact_sum(rows))
}

fn exact_sum(rows: &[InstallmentRow]) -> i128 {
    rows.iter().map(|row| i128::from(row.amount.units())).sum()
}

/// Target minus the current row total. Advisory only; use [`validate`] to
/// decide whether a plan may be committed.
pub fn diff(rows: &[InstallmentRow], target: Money) -> Money {
    Money::saturating_from_wide(i128::from(target.units()) - exact_sum(rows))
}

/// Commit gate. Checks run in a fixed order and the first failure wins.
pub fn validate(
    rows: &[InstallmentRow],
    target: Money,
    channel_selected: bool,
) -> Result<(), ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }

    let actual = exact_sum(rows);
    if actual != i128::from(target.units()) {
        return Err(ValidationError::AmountMismatch {
            expected: target,
            actual: Money::saturating_from_wide(actual),
        });
    }

    if let Some(row) = rows.iter().find(|row| !row.is_complete()) {
        return Err(ValidationError::IncompleteRow {
            row_id: row.id.clone(),
        });
    }

    if !channel_selected {
        return Err(ValidationError::ChannelNotSelected);
    }

    Ok(())
}
