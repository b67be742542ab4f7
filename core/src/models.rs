use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::roster::{AgentKey, Tool};
use crate::wizard::OnboardingRecord;

/// Opaque, stable workspace identifier created client-side.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkspaceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user workspace as persisted in local durable storage.
///
/// `selections` mirrors the remote assignment row for display after a
/// restart; the remote row remains the source of truth.
///
/// # Examples
///
/// ```rust
/// use workspace_core::models::Workspace;
///
/// let ws = Workspace::new("Q3 outbound");
/// assert!(!ws.onboarding_completed);
/// assert!(ws.selections.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    /// Flips to true exactly once, when onboarding is started
    pub onboarding_completed: bool,
    /// Aggregate intake answers handed over by the wizard
    pub onboarding: Option<OnboardingRecord>,
    pub selections: BTreeMap<AgentKey, String>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId::generate(),
            name: name.into(),
            onboarding_completed: false,
            onboarding: None,
            selections: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// Data transfer object for creating workspaces
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkspace {
    pub id: WorkspaceId,
    pub name: String,
}

impl NewWorkspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId::generate(),
            name: name.into(),
        }
    }
}

/// 2D point in board container coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Board container dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Explicit sidebar state shared with the board instead of reading layout
/// back from the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidebarState {
    pub open: bool,
    pub width: f64,
}

impl SidebarState {
    pub const fn new(open: bool, width: f64) -> Self {
        Self { open, width }
    }

    /// Width left for the board inside a viewport of `viewport_width`
    pub fn board_width(&self, viewport_width: f64) -> f64 {
        if self.open {
            (viewport_width - self.width.max(0.0)).max(0.0)
        } else {
            viewport_width.max(0.0)
        }
    }
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new(true, 256.0)
    }
}

/// In-memory assignment of a tool to an agent for the active session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub agent: AgentKey,
    pub tool: Tool,
    pub position: Point,
}

/// At most one assignment per agent; iteration follows roster order.
pub type AssignmentMap = BTreeMap<AgentKey, Assignment>;

/// Remote assignment record, one row per workspace.
///
/// Agent fields carry the raw stored value, which may be stale, mis-cased,
/// or not allowed for the agent at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub workspace_id: String,
    #[serde(default)]
    pub leo: Option<String>,
    #[serde(default)]
    pub mike: Option<String>,
    #[serde(default)]
    pub sara: Option<String>,
    #[serde(default)]
    pub nina: Option<String>,
    #[serde(default)]
    pub alex: Option<String>,
    #[serde(default)]
    pub emma: Option<String>,
}

impl AssignmentRow {
    /// Row with every agent unassigned
    pub fn empty(workspace_id: &WorkspaceId) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            ..Self::default()
        }
    }

    pub fn get(&self, agent: AgentKey) -> Option<&str> {
        self.slot(agent).as_deref()
    }

    pub fn set(&mut self, agent: AgentKey, value: Option<String>) {
        *self.slot_mut(agent) = value;
    }

    /// Builder-style setter used by tests and fixtures
    pub fn with(mut self, agent: AgentKey, value: &str) -> Self {
        self.set(agent, Some(value.to_string()));
        self
    }

    fn slot(&self, agent: AgentKey) -> &Option<String> {
        match agent {
            AgentKey::Leo => &self.leo,
            AgentKey::Mike => &self.mike,
            AgentKey::Sara => &self.sara,
            AgentKey::Nina => &self.nina,
            AgentKey::Alex => &self.alex,
            AgentKey::Emma => &self.emma,
        }
    }

    fn slot_mut(&mut self, agent: AgentKey) -> &mut Option<String> {
        match agent {
            AgentKey::Leo => &mut self.leo,
            AgentKey::Mike => &mut self.mike,
            AgentKey::Sara => &mut self.sara,
            AgentKey::Nina => &mut self.nina,
            AgentKey::Alex => &mut self.alex,
            AgentKey::Emma => &mut self.emma,
        }
    }
}

/// Message posted in the workspace chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub workspace_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
