//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Workspace names
//! - Assignment rows mixing valid, mis-cased, foreign and unknown tools
//! - Property-based testing strategies

use fake::faker::company::en::{Bs, CompanyName};
use fake::Fake;
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use workspace_core::{
    AgentKey, AssignmentRow, ContainerSize, Tool, Workspace, WorkspaceId, BOARD_ROSTER,
};

/// Generate a realistic workspace name
pub fn generate_workspace_name() -> String {
    let company: String = CompanyName().fake();
    format!("{company} outreach")
}

/// Generate a random workspace
pub fn generate_random_workspace() -> Workspace {
    Workspace::new(generate_workspace_name())
}

/// Pick a random tool allowed for `agent`
pub fn generate_allowed_tool(agent: AgentKey) -> Tool {
    let mut rng = rand::thread_rng();
    *agent
        .allowed_tools()
        .choose(&mut rng)
        .unwrap_or(&Tool::Apollo)
}

/// Random row where each agent is unassigned, valid, or garbage
pub fn generate_random_row(workspace_id: &WorkspaceId) -> AssignmentRow {
    let mut rng = rand::thread_rng();
    let mut row = AssignmentRow::empty(workspace_id);
    for agent in BOARD_ROSTER {
        let value = match rng.gen_range(0..4) {
            0 => None,
            1 => Some(generate_allowed_tool(agent).name().to_string()),
            2 => Some(generate_allowed_tool(agent).name().to_uppercase()),
            _ => Some(Bs().fake::<String>()),
        };
        row.set(agent, value);
    }
    row
}

/// Proptest strategy for board agents
pub fn agent_strategy() -> impl Strategy<Value = AgentKey> {
    prop::sample::select(BOARD_ROSTER.to_vec())
}

/// Proptest strategy for any tool in the registry
pub fn tool_strategy() -> impl Strategy<Value = Tool> {
    prop::sample::select(Tool::ALL.to_vec())
}

/// Raw remote values: registry names in any case, or arbitrary text
pub fn raw_tool_value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        tool_strategy().prop_map(|t| Some(t.name().to_string())),
        tool_strategy().prop_map(|t| Some(t.name().to_lowercase())),
        "[A-Za-z ]{0,16}".prop_map(Some),
    ]
}

/// Proptest strategy for remote assignment rows
pub fn assignment_row_strategy() -> impl Strategy<Value = AssignmentRow> {
    prop::collection::vec(raw_tool_value_strategy(), BOARD_ROSTER.len()).prop_map(|values| {
        let mut row = AssignmentRow::empty(&WorkspaceId::from("ws-prop"));
        for (agent, value) in BOARD_ROSTER.into_iter().zip(values) {
            row.set(agent, value);
        }
        row
    })
}

/// Proptest strategy for container sizes, degenerate ones included
pub fn container_strategy() -> impl Strategy<Value = ContainerSize> {
    (0.0f64..2400.0, 0.0f64..1600.0).prop_map(|(w, h)| ContainerSize::new(w, h))
}
