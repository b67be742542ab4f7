//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - Workspaces before and after onboarding
//! - Assignment rows, valid and stale
//! - Complete intake answers for the four-step wizard

use std::collections::BTreeMap;
use workspace_core::wizard::{OnboardingRecord, StepPayload};
use workspace_core::{AgentKey, AssignmentRow, ContainerSize, NewWorkspace, Workspace, WorkspaceId};

/// Container used by most board tests
pub const TEST_CONTAINER: ContainerSize = ContainerSize::new(1000.0, 600.0);

/// Create a basic workspace that still needs onboarding
pub fn create_test_workspace() -> Workspace {
    let mut workspace = Workspace::new("Test Workspace");
    workspace.id = WorkspaceId::from("ws-test-001");
    workspace
}

/// Workspace whose onboarding has been started
pub fn create_onboarded_workspace() -> Workspace {
    let mut workspace = create_test_workspace();
    workspace.onboarding_completed = true;
    workspace.onboarding = Some(create_onboarding_record());
    workspace
}

/// Create multiple unique workspaces
pub fn create_test_workspaces(count: usize) -> Vec<Workspace> {
    (1..=count)
        .map(|i| {
            let mut workspace = Workspace::new(format!("Workspace {i}"));
            workspace.id = WorkspaceId::from(format!("ws-test-{i:03}"));
            workspace.onboarding_completed = i % 2 == 0;
            workspace
        })
        .collect()
}

/// Create a standard NewWorkspace for testing creation
pub fn create_new_workspace() -> NewWorkspace {
    NewWorkspace::new("New Test Workspace")
}

/// Row with a valid tool for every board agent
pub fn create_full_row(workspace_id: &WorkspaceId) -> AssignmentRow {
    AssignmentRow::empty(workspace_id)
        .with(AgentKey::Leo, "Apollo")
        .with(AgentKey::Mike, "Gmail")
        .with(AgentKey::Sara, "HubSpot")
        .with(AgentKey::Nina, "Calendly")
        .with(AgentKey::Alex, "LinkedIn")
        .with(AgentKey::Emma, "Slack")
}

/// Row carrying values a reconciler must drop: unknown tools, tools of
/// another agent, empty strings. Only sara's mis-cased value survives.
pub fn create_stale_row(workspace_id: &WorkspaceId) -> AssignmentRow {
    AssignmentRow::empty(workspace_id)
        .with(AgentKey::Leo, "Gmail")
        .with(AgentKey::Mike, "Carrier Pigeon")
        .with(AgentKey::Sara, "hubspot")
        .with(AgentKey::Nina, "")
}

/// Answers for every intake step, keyed by field key
pub fn create_intake_answers() -> Vec<StepPayload> {
    vec![
        payload(&[("targetCustomers", "500")]),
        payload(&[("companySize", "51-200"), ("jobTitles", "VP Sales, Head of Growth")]),
        payload(&[("channel", "Email"), ("channelDetails", "Warm intro sequence")]),
        payload(&[
            ("valueProposition", "Book more qualified meetings"),
            ("dailyLimit", "40"),
        ]),
    ]
}

/// Aggregate record produced by `create_intake_answers`
pub fn create_onboarding_record() -> OnboardingRecord {
    OnboardingRecord {
        fields: create_intake_answers().into_iter().flatten().collect(),
    }
}

fn payload(entries: &[(&str, &str)]) -> StepPayload {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>()
}
