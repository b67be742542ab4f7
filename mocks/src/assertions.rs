//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Workspace equality with clear error messages
//! - Board invariants (allowed tools, positions on the layout)

use workspace_core::{AssignmentBoard, Workspace};

/// Assert workspaces are equal ignoring timestamps
pub fn assert_workspace_equals(actual: &Workspace, expected: &Workspace) {
    assert_eq!(actual.id, expected.id, "Workspace IDs don't match");
    assert_eq!(actual.name, expected.name, "Workspace names don't match");
    assert_eq!(
        actual.onboarding_completed, expected.onboarding_completed,
        "Onboarding flags don't match"
    );
    assert_eq!(actual.onboarding, expected.onboarding, "Onboarding records don't match");
    assert_eq!(actual.selections, expected.selections, "Selections don't match");
}

/// Assert workspaces are listed oldest first
pub fn assert_workspaces_sorted_by_creation(workspaces: &[Workspace]) {
    for window in workspaces.windows(2) {
        assert!(
            window[0].created_at <= window[1].created_at,
            "Workspaces are not sorted oldest first. '{}' ({}) comes before '{}' ({})",
            window[0].name,
            window[0].created_at,
            window[1].name,
            window[1].created_at
        );
    }
}

/// Assert every assignment on the board uses a tool its agent allows
/// and sits on the agent's layout position
pub fn assert_board_consistent(board: &AssignmentBoard) {
    for (agent, assignment) in board.assignments() {
        assert_eq!(*agent, assignment.agent, "Assignment keyed under the wrong agent");
        assert!(
            agent.allowed_tools().contains(&assignment.tool),
            "Agent '{}' holds '{}' which is not in its allowed set {:?}",
            agent,
            assignment.tool.name(),
            agent.allowed_tools()
        );
        assert_eq!(
            board.layout().position(*agent),
            Some(assignment.position),
            "Assignment for '{agent}' is not at the agent's layout position"
        );
    }
}
