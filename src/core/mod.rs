pub mod allocator;
pub mod controller;
pub mod due_date;
pub mod reconciler;
pub mod validator;

pub use crate::domain::model::{InstallmentRow, Money, PlanShape, RowEdit, Tenor};
pub use crate::domain::ports::PaymentGateway;
pub use crate::utils::error::Result;
