use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{AssignmentRow, ChatMessage, NewWorkspace, Workspace, WorkspaceId},
    roster::{AgentKey, Tool},
    wizard::OnboardingRecord,
};

/// Remote keyed assignment record, one row per workspace.
///
/// Implementations talk to a hosted data service. Writes are partial: only
/// the named agent's field may change.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Read the row for a workspace
    ///
    /// # Returns
    /// * `Ok(Some(row))` - The current row
    /// * `Ok(None)` - No row yet; nobody has an assignment
    /// * `Err(WorkspaceError::Store)` - Network or service failure
    async fn fetch(&self, workspace_id: &WorkspaceId) -> Result<Option<AssignmentRow>>;

    /// Upsert a single agent field, leaving the other agents untouched
    ///
    /// # Arguments
    /// * `tool` - Canonical tool, or `None` to clear the field
    async fn upsert_field(
        &self,
        workspace_id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<Tool>,
    ) -> Result<()>;

    /// Create an empty row if none exists
    async fn create_empty(&self, workspace_id: &WorkspaceId) -> Result<()>;
}

/// Chat panel messages of a workspace
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Messages created at or after `after` (all messages when `None`),
    /// oldest first. Callers dedupe by id.
    async fn messages_since(
        &self,
        workspace_id: &WorkspaceId,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>>;
}

/// Local durable storage for workspace records
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Create a workspace
    ///
    /// # Returns
    /// * `Ok(Workspace)` - The stored workspace, onboarding not completed
    /// * `Err(WorkspaceError::Validation)` - If the name is invalid
    /// * `Err(WorkspaceError::Database)` - If the operation fails
    async fn create(&self, workspace: NewWorkspace) -> Result<Workspace>;

    /// Get a workspace by id
    async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>>;

    /// All workspaces, oldest first
    async fn list(&self) -> Result<Vec<Workspace>>;

    /// Change the display name
    async fn rename(&self, id: &WorkspaceId, name: &str) -> Result<Workspace>;

    /// Mirror a board selection; `None` removes it
    async fn set_selection(
        &self,
        id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<&str>,
    ) -> Result<()>;

    /// Hand the aggregate intake record to the workspace and set
    /// `onboarding_completed`. Only the first call stores a record; later
    /// calls return the workspace unchanged.
    async fn complete_onboarding(
        &self,
        id: &WorkspaceId,
        record: &OnboardingRecord,
    ) -> Result<Workspace>;

    /// Delete a workspace
    ///
    /// # Returns
    /// * `Ok(())` - Deleted
    /// * `Err(WorkspaceError::NotFound)` - If it does not exist
    async fn delete(&self, id: &WorkspaceId) -> Result<()>;

    /// Storage health for diagnostics
    async fn health_check(&self) -> Result<()>;
}

/// Fire-and-forget JSON POST to an external workflow runner.
///
/// Only success or failure is consumed; response bodies are ignored.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        organization_id: &str,
        body: &serde_json::Value,
    ) -> Result<()>;
}
