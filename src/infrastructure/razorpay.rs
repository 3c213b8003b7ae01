use crate::config::GatewayCredentials;
use crate::domain::ports::{GatewayOrder, OrderRequest, PaymentGateway};
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com/v1";

/// Razorpay Orders API client.
pub struct RazorpayGateway {
    client: Client,
    base_url: String,
    credentials: GatewayCredentials,
}

impl RazorpayGateway {
    /// Builds a client whose requests are bounded by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: GatewayCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(RegistrationError::internal)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "gateway rejected order request");
            return Err(RegistrationError::Upstream(format!(
                "order request failed with status {status}"
            )));
        }

        let order: GatewayOrder = response.json().await?;
        Ok(order)
    }
}
