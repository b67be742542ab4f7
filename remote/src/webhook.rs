//! Outbound notifications to the external workflow runner

use async_trait::async_trait;
use std::time::Duration;
use workspace_core::{
    error::{Result, WorkspaceError},
    repository::WebhookSink,
};

/// Header naming the organization a notification belongs to
pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// JSON webhook sink; only the response status is consumed
#[derive(Clone)]
pub struct HttpWebhookSink {
    http: reqwest::Client,
}

impl HttpWebhookSink {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn post_json(
        &self,
        url: &str,
        organization_id: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let response = self
            .http
            .post(url)
            .header(ORGANIZATION_HEADER, organization_id)
            .json(body)
            .send()
            .await
            .map_err(|e| WorkspaceError::notification(format!("POST {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkspaceError::notification(format!(
                "POST {url} failed with status {status}"
            )));
        }

        tracing::debug!(url, status = status.as_u16(), "Notification delivered");
        Ok(())
    }
}
