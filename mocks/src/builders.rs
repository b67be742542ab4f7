//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Workspace construction with sensible defaults
//! - Assignment rows written by "another client"

use chrono::{DateTime, Utc};
use workspace_core::wizard::OnboardingRecord;
use workspace_core::{AgentKey, AssignmentRow, Workspace, WorkspaceId};

/// Builder for constructing Workspace instances in tests
pub struct WorkspaceBuilder {
    workspace: Workspace,
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        let mut workspace = Workspace::new("Test Workspace");
        workspace.id = WorkspaceId::from("ws-test-001");
        Self { workspace }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.workspace.id = WorkspaceId::from(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.workspace.name = name.into();
        self
    }

    /// Mark onboarding as started, storing the given record
    pub fn onboarded(mut self, record: OnboardingRecord) -> Self {
        self.workspace.onboarding_completed = true;
        self.workspace.onboarding = Some(record);
        self
    }

    pub fn with_selection(mut self, agent: AgentKey, tool: impl Into<String>) -> Self {
        self.workspace.selections.insert(agent, tool.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.workspace.created_at = created_at;
        self
    }

    /// Build the final Workspace
    pub fn build(self) -> Workspace {
        self.workspace
    }
}

/// Builder for remote assignment rows
pub struct AssignmentRowBuilder {
    row: AssignmentRow,
}

impl AssignmentRowBuilder {
    pub fn new(workspace_id: &WorkspaceId) -> Self {
        Self {
            row: AssignmentRow::empty(workspace_id),
        }
    }

    /// Store a raw value for an agent; no validation happens here
    pub fn with(mut self, agent: AgentKey, value: impl Into<String>) -> Self {
        self.row.set(agent, Some(value.into()));
        self
    }

    pub fn without(mut self, agent: AgentKey) -> Self {
        self.row.set(agent, None);
        self
    }

    pub fn build(self) -> AssignmentRow {
        self.row
    }
}
