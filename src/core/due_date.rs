//! Due dates fall on a fixed day of the month.

use chrono::{Datelike, Months, NaiveDate};

/// Every installment is due on this day of its month. All Gregorian months
/// have one.
pub const DUE_DAY_OF_MONTH: u32 = 28;

/// 28th of the month `sequence_index` months after `as_of`'s month.
///
/// `as_of` is shared by every row of one generated batch so the offsets stay
/// consistent even if the clock moves on while the user is editing.
pub fn due_date_for(sequence_index: u32, as_of: NaiveDate) -> NaiveDate {
    // Day 28 exists in every month, so anchoring there first means the month
    // addition never has to clamp.
    let anchor = as_of.with_day(DUE_DAY_OF_MONTH).unwrap_or(as_of);

    anchor
        .checked_add_months(Months::new(sequence_index))
        .unwrap_or(NaiveDate::MAX)
}
