use crate::domain::model::CommitRequest;
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Remote side of a commit: stores the payment rows, then moves the host
/// record to its next workflow stage.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn save_payments(&self, request: &CommitRequest) -> Result<(), GatewayError>;
    async fn advance_stage(&self, record_id: &str) -> Result<(), GatewayError>;
}

pub trait GatewaySettings: Send + Sync {
    fn base_url(&self) -> &str;
    fn save_path(&self) -> &str;
    fn advance_path(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn headers(&self) -> Option<&HashMap<String, String>>;
}
