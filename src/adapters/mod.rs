// Adapters layer: concrete implementations for systems outside the plan core.

pub mod export;
pub mod http;

pub use export::{render, OutputFormat};
pub use http::HttpPaymentGateway;
