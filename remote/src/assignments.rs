//! AssignmentStore over the REST data service

use async_trait::async_trait;
use serde_json::{Map, Value};
use workspace_core::{
    error::{Result, WorkspaceError},
    models::{AssignmentRow, WorkspaceId},
    repository::AssignmentStore,
    roster::{AgentKey, Tool},
};

use crate::client::{send, RestClient};

/// Reads and partially upserts the one-row-per-workspace assignment table.
#[derive(Clone)]
pub struct RestAssignmentStore {
    client: RestClient,
    table: String,
}

impl RestAssignmentStore {
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    async fn upsert(&self, workspace_id: &WorkspaceId, body: Value) -> Result<()> {
        let request = self
            .client
            .post(&self.table)
            .query(&[("on_conflict", "workspace_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        send(request, "Assignment upsert").await?;
        tracing::debug!(workspace_id = %workspace_id, "Assignment row upserted");
        Ok(())
    }
}

/// Body carrying only `workspace_id` plus, optionally, one agent field
fn upsert_body(workspace_id: &WorkspaceId, field: Option<(AgentKey, Option<Tool>)>) -> Value {
    let mut body = Map::new();
    body.insert(
        "workspace_id".to_string(),
        Value::String(workspace_id.to_string()),
    );
    if let Some((agent, tool)) = field {
        let value = tool
            .map(|t| Value::String(t.name().to_string()))
            .unwrap_or(Value::Null);
        body.insert(agent.as_str().to_string(), value);
    }
    Value::Object(body)
}

#[async_trait]
impl AssignmentStore for RestAssignmentStore {
    async fn fetch(&self, workspace_id: &WorkspaceId) -> Result<Option<AssignmentRow>> {
        let request = self.client.get(&self.table).query(&[
            ("workspace_id", format!("eq.{workspace_id}")),
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ]);

        let response = send(request, "Assignment fetch").await?;
        let mut rows: Vec<AssignmentRow> = response
            .json()
            .await
            .map_err(|e| WorkspaceError::store(format!("Invalid assignment row: {e}")))?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn upsert_field(
        &self,
        workspace_id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<Tool>,
    ) -> Result<()> {
        self.upsert(workspace_id, upsert_body(workspace_id, Some((agent, tool))))
            .await
    }

    async fn create_empty(&self, workspace_id: &WorkspaceId) -> Result<()> {
        self.upsert(workspace_id, upsert_body(workspace_id, None))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_body_is_partial() {
        let id = WorkspaceId::from("ws-1");
        let body = upsert_body(&id, Some((AgentKey::Emma, Some(Tool::GoogleSheets))));
        assert_eq!(
            body,
            serde_json::json!({"workspace_id": "ws-1", "emma": "Google Sheets"})
        );

        let cleared = upsert_body(&id, Some((AgentKey::Leo, None)));
        assert_eq!(cleared, serde_json::json!({"workspace_id": "ws-1", "leo": null}));

        assert_eq!(
            upsert_body(&id, None),
            serde_json::json!({"workspace_id": "ws-1"})
        );
    }
}
