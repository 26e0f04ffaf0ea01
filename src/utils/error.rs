use crate::domain::model::Money;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Plan total must be greater than zero (got {total})")]
    InvalidTotal { total: Money },

    #[error("Select a tenor before generating installments")]
    MissingTenor,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The plan has no payment rows")]
    EmptyPlan,

    #[error("Installments must add up to {expected}, but they add up to {actual}")]
    AmountMismatch { expected: Money, actual: Money },

    #[error("Row {row_id} needs an amount greater than zero and a due date")]
    IncompleteRow { row_id: String },

    #[error("Select a payment channel before saving")]
    ChannelNotSelected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("Saving payments failed: {message}")]
    PersistenceFailed { message: String },

    #[error("Payments were saved but advancing the stage failed: {message}")]
    StageAdvanceFailed { message: String },
}

/// Failure reported by a [`crate::domain::ports::PaymentGateway`] implementation.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("A commit is already in progress; wait for it to finish")]
    CommitInFlight,

    #[error("Cannot {action} while the plan is {state}")]
    InvalidState { state: String, action: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Allocation,
    Validation,
    Commit,
    State,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PlanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlanError::Allocation(_) => ErrorCategory::Allocation,
            PlanError::Validation(_) => ErrorCategory::Validation,
            PlanError::Commit(_) => ErrorCategory::Commit,
            PlanError::CommitInFlight | PlanError::InvalidState { .. } => ErrorCategory::State,
            PlanError::ConfigValidationError { .. }
            | PlanError::InvalidConfigValueError { .. }
            | PlanError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PlanError::IoError(_) | PlanError::CsvError(_) | PlanError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// Everything the user can fix by editing the plan is `Low`; failures of
    /// the remote collaborator are `Medium` because a retry may succeed.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Allocation | ErrorCategory::Validation | ErrorCategory::State => {
                ErrorSeverity::Low
            }
            ErrorCategory::Commit => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PlanError::Validation(ValidationError::AmountMismatch { expected, actual }) => {
                format!(
                    "Total of installments ({}) must equal the amount ({}); difference {}",
                    actual,
                    expected,
                    *expected - *actual
                )
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PlanError::Allocation(AllocationError::InvalidTotal { .. }) => {
                "Set an amount greater than zero on the record before generating a plan"
            }
            PlanError::Allocation(AllocationError::MissingTenor) => {
                "Pick the number of installments"
            }
            PlanError::Validation(ValidationError::EmptyPlan) => {
                "Choose full payment or pick a tenor to generate rows"
            }
            PlanError::Validation(ValidationError::AmountMismatch { .. }) => {
                "Adjust row amounts until the difference is zero"
            }
            PlanError::Validation(ValidationError::IncompleteRow { .. }) => {
                "Give every row a positive amount and a due date"
            }
            PlanError::Validation(ValidationError::ChannelNotSelected) => {
                "Pick a payment channel"
            }
            PlanError::Commit(_) => "Check the connection to the payment service and retry",
            PlanError::CommitInFlight => "Wait for the current save to finish",
            PlanError::InvalidState { .. } => "Open a new plan to make further changes",
            PlanError::ConfigValidationError { .. }
            | PlanError::InvalidConfigValueError { .. }
            | PlanError::MissingConfigError { .. } => "Fix the configuration file and try again",
            PlanError::IoError(_) | PlanError::CsvError(_) | PlanError::SerializationError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
