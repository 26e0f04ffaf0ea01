use crate::core::due_date::due_date_for;
use crate::domain::model::{InstallmentRow, Money, PlanShape, FULL_PAYMENT_LABEL};
use crate::utils::error::AllocationError;
use chrono::NaiveDate;

/// Split `total` into rows for `shape`, due dates anchored on `as_of`.
///
/// Installments get `floor(total / tenor)` each and the last one also takes
/// the remainder, so the rows always add up to `total` exactly.
pub fn generate(
    total: Money,
    shape: &PlanShape,
    as_of: NaiveDate,
) -> Result<Vec<InstallmentRow>, AllocationError> {
    if !total.is_positive() {
        return Err(AllocationError::InvalidTotal { total });
    }

    let rows = match shape {
        PlanShape::Full => vec![InstallmentRow::new(
            FULL_PAYMENT_LABEL,
            1,
            total,
            due_date_for(1, as_of),
        )],
        PlanShape::Installment { tenor } => {
            let count = tenor.ok_or(AllocationError::MissingTenor)?.count();
            let base = total.units() / i64::from(count);
            let remainder = total.units() - base * i64::from(count);

            (1..=count)
                .map(|sequence| {
                    let amount = if sequence == count {
                        base + remainder
                    } else {
                        base
                    };
                    InstallmentRow::new(
                        format!("Installment {}", sequence),
                        sequence,
                        Money::new(amount),
                        due_date_for(sequence, as_of),
                    )
                })
                .collect()
        }
    };

    tracing::debug!(
        "Allocated {} across {} row(s) for {:?}",
        total,
        rows.len(),
        shape
    );
    Ok(rows)
}
