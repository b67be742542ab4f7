//! Chat panel messages over the REST data service

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use workspace_core::{
    error::{Result, WorkspaceError},
    models::{ChatMessage, WorkspaceId},
    repository::MessageStore,
};

use crate::client::{send, RestClient};

#[derive(Clone)]
pub struct RestMessageStore {
    client: RestClient,
    table: String,
}

impl RestMessageStore {
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl MessageStore for RestMessageStore {
    async fn messages_since(
        &self,
        workspace_id: &WorkspaceId,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        let mut query = vec![
            ("workspace_id", format!("eq.{workspace_id}")),
            ("select", "*".to_string()),
            ("order", "created_at.asc".to_string()),
        ];
        if let Some(after) = after {
            query.push((
                "created_at",
                format!("gte.{}", after.to_rfc3339_opts(SecondsFormat::Micros, true)),
            ));
        }

        let response = send(self.client.get(&self.table).query(&query), "Message fetch").await?;
        response
            .json()
            .await
            .map_err(|e| WorkspaceError::store(format!("Invalid chat message: {e}")))
    }
}
