use crate::domain::ports::{ApprovalNotice, Notifier};
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Records approvals in the log only. Used when no mail service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn registration_approved(&self, notice: ApprovalNotice) -> Result<()> {
        tracing::info!(
            registration_id = %notice.registration_id,
            event_id = %notice.event_id,
            team = %notice.team_name,
            "registration approved (no mail service configured)"
        );
        Ok(())
    }
}

/// Posts approval notices as JSON to the external mail service.
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RegistrationError::internal)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn registration_approved(&self, notice: ApprovalNotice) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({
                "type": "approval",
                "registration": notice,
            }))
            .send()
            .await
            .map_err(RegistrationError::internal)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistrationError::internal(format!(
                "mail service answered {status}"
            )));
        }
        Ok(())
    }
}
