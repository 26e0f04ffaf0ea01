use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Passed through to the persistence collaborator on every commit.
pub const ALLOCATION_TAG: &str = "Tuition Fee";
pub const PAYMENT_STATUS_TAG: &str = "Unpaid";

pub const FULL_PAYMENT_LABEL: &str = "Full Payment";

/// Integer count of minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    pub const fn units(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Clamps a widened amount back into range.
    pub fn saturating_from_wide(units: i128) -> Self {
        Self(units.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// Formats with a thousands separator, e.g. `1.250.000` for `sep = '.'`.
    pub fn format_grouped(self, sep: char) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            grouped.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(sep);
            }
            grouped.push(ch);
        }
        grouped
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

// Edited amounts are arbitrary, so arithmetic saturates instead of
// overflowing. Exact comparisons go through `i128` in the validator.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money::saturating_from_wide(iter.map(|m| i128::from(m.0)).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Number of installments. Only the values in [`Tenor::ALLOWED`] can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Tenor(u32);

impl Tenor {
    pub const ALLOWED: [u32; 4] = [2, 4, 8, 12];

    pub fn new(count: u32) -> Option<Self> {
        Self::ALLOWED.contains(&count).then_some(Self(count))
    }

    pub fn count(self) -> u32 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Tenor> {
        Self::ALLOWED.into_iter().map(Tenor)
    }
}

impl TryFrom<u32> for Tenor {
    type Error = String;

    fn try_from(count: u32) -> std::result::Result<Self, Self::Error> {
        Tenor::new(count).ok_or_else(|| {
            format!(
                "unsupported tenor {}; choose one of {:?}",
                count,
                Tenor::ALLOWED
            )
        })
    }
}

impl From<Tenor> for u32 {
    fn from(tenor: Tenor) -> u32 {
        tenor.0
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanShape {
    #[default]
    Full,
    Installment { tenor: Option<Tenor> },
}

impl PlanShape {
    pub fn installment(tenor: Tenor) -> Self {
        PlanShape::Installment { tenor: Some(tenor) }
    }

    pub fn tenor(&self) -> Option<Tenor> {
        match self {
            PlanShape::Full => None,
            PlanShape::Installment { tenor } => *tenor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentRow {
    pub id: String,
    pub label: String,
    pub sequence: u32,
    pub amount: Money,
    pub due_date: Option<NaiveDate>,
}

impl InstallmentRow {
    pub fn new(label: impl Into<String>, sequence: u32, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            id: sequence.to_string(),
            label: label.into(),
            sequence,
            amount,
            due_date: Some(due_date),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.amount.is_positive() && self.due_date.is_some()
    }
}

/// Draft override for a single row. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowEdit {
    pub amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
}

impl RowEdit {
    pub fn amount(amount: Money) -> Self {
        Self {
            amount: Some(amount),
            due_date: None,
        }
    }

    pub fn due_date(due_date: NaiveDate) -> Self {
        Self {
            amount: None,
            due_date: Some(due_date),
        }
    }
}

/// Opaque reference to the selected payment method or destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    #[serde(rename = "num")]
    pub sequence_number: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// Payload handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub record_id: String,
    pub items: Vec<PaymentItem>,
    pub payment_channel_id: ChannelId,
    pub allocation: String,
    pub payment_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub record_id: String,
    pub installments: usize,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message the host presents to the user; the core never renders anything itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

impl From<&CommitReceipt> for Notice {
    fn from(receipt: &CommitReceipt) -> Self {
        Notice::success(format!(
            "Payment information created: {} payment(s) totalling {}",
            receipt.installments, receipt.total
        ))
    }
}

impl From<&crate::utils::error::PlanError> for Notice {
    fn from(err: &crate::utils::error::PlanError) -> Self {
        Notice::error(err.user_friendly_message())
    }
}
