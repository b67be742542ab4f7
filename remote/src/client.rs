//! Shared HTTP client for the hosted REST data service

use serde::{Deserialize, Serialize};
use std::time::Duration;
use workspace_core::error::{Result, WorkspaceError};

/// Connection settings for a PostgREST-style data service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestConfig {
    /// Service root, e.g. `https://project.example.co`
    pub base_url: String,
    /// Sent both as `apikey` and as bearer token
    pub api_key: String,
    pub assignments_table: String,
    pub messages_table: String,
    pub timeout_ms: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            assignments_table: "agent_assignments".to_string(),
            messages_table: "chat_messages".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Thin wrapper adding auth headers and table URLs to `reqwest`
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(config: &RestConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    pub(crate) fn get(&self, table: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(self.table_url(table)))
    }

    pub(crate) fn post(&self, table: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(self.table_url(table)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            return request;
        }
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Send a request and turn transport failures and non-2xx statuses into
/// `WorkspaceError::Store`
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    action: &str,
) -> Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| WorkspaceError::store(format!("{action} failed: {e}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(WorkspaceError::store(format!(
        "{action} failed: {status} - {body}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let client = RestClient::new(&RestConfig {
            base_url: "https://data.example.co/".to_string(),
            ..RestConfig::default()
        });
        assert_eq!(
            client.table_url("agent_assignments"),
            "https://data.example.co/rest/v1/agent_assignments"
        );
    }
}
