pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpPaymentGateway;
pub use config::PlanConfig;
pub use self::core::controller::{PlanController, PlanState};
pub use domain::model::{
    ChannelId, CommitReceipt, CommitRequest, InstallmentRow, Money, Notice, PlanShape, RowEdit,
    Tenor,
};
pub use domain::ports::PaymentGateway;
pub use utils::error::{PlanError, Result};
