use crate::domain::model::CommitRequest;
use crate::domain::ports::{GatewaySettings, PaymentGateway};
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

/// Payment gateway backed by two JSON endpoints on a remote service.
pub struct HttpPaymentGateway<C: GatewaySettings> {
    config: C,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceStageRequest<'a> {
    record_id: &'a str,
}

impl<C: GatewaySettings> HttpPaymentGateway<C> {
    pub fn new(config: C) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url().trim_end_matches('/'), path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);

        let mut builder = self.client.post(url);
        if let Some(headers) = self.config.headers() {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        builder
    }

    /// Turn a non-2xx response into [`GatewayError::Rejected`], preferring the
    /// `message` field of a JSON error body.
    async fn check(response: Response) -> Result<(), GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        tracing::warn!("Gateway responded {}: {}", status, message);
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl<C: GatewaySettings> PaymentGateway for HttpPaymentGateway<C> {
    async fn save_payments(&self, request: &CommitRequest) -> Result<(), GatewayError> {
        tracing::info!(
            "Saving {} payment(s) for {}",
            request.items.len(),
            request.record_id
        );
        let response = self.post(self.config.save_path()).json(request).send().await?;
        Self::check(response).await
    }

    async fn advance_stage(&self, record_id: &str) -> Result<(), GatewayError> {
        tracing::info!("Advancing stage for {}", record_id);
        let response = self
            .post(self.config.advance_path())
            .json(&AdvanceStageRequest { record_id })
            .send()
            .await?;
        Self::check(response).await
    }
}
