//! Composition of what the AI Workspace screen shows.
//!
//! The screen is either the intake wizard or the assignment board, chosen
//! only by the workspace's `onboarding_completed` flag. Board composition is
//! fallible; [`render_board`] is the boundary that turns a composition fault
//! into a recoverable fallback instead of failing the whole screen.

use serde::Serialize;
use tracing::warn;

use crate::board::AssignmentBoard;
use crate::error::{Result, WorkspaceError};
use crate::geometry::{compute_connector, Connector};
use crate::models::{ContainerSize, Point, Workspace};
use crate::roster::{AgentKey, Tool, BOARD_ROSTER};
use crate::wizard::{FieldKind, StepEngine, WizardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    Onboarding,
    Board,
}

pub fn view_mode(workspace: &Workspace) -> ViewMode {
    if workspace.onboarding_completed {
        ViewMode::Board
    } else {
        ViewMode::Onboarding
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub agent: AgentKey,
    pub role: &'static str,
    pub position: Point,
    pub tool: Option<Tool>,
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorView {
    pub from: AgentKey,
    pub to: AgentKey,
    pub curve: Connector,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardScene {
    pub size: ContainerSize,
    pub nodes: Vec<NodeView>,
    pub connectors: Vec<ConnectorView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Rendered {
    Scene(BoardScene),
    /// Shown in place of the board; the caller offers a retry
    Fallback { message: String, retryable: bool },
}

/// Build the board scene: one node per roster agent, connectors between
/// consecutive assigned agents in roster order.
pub fn compose_board(board: &AssignmentBoard) -> Result<BoardScene> {
    let mut nodes = Vec::with_capacity(BOARD_ROSTER.len());
    for agent in BOARD_ROSTER {
        let assignment = board.get(agent);
        let position = assignment
            .map(|a| a.position)
            .or_else(|| board.layout().position(agent))
            .ok_or_else(|| WorkspaceError::Render(format!("No position for agent {agent}")))?;
        if !position.is_finite() {
            return Err(WorkspaceError::Render(format!(
                "Non-finite position for agent {agent}"
            )));
        }
        nodes.push(NodeView {
            agent,
            role: agent.role(),
            position,
            tool: assignment.map(|a| a.tool),
            icon: assignment.map(|a| a.tool.icon()),
        });
    }

    let assigned: Vec<&NodeView> = nodes.iter().filter(|n| n.tool.is_some()).collect();
    let connectors = assigned
        .windows(2)
        .map(|pair| {
            let curve = compute_connector(pair[0].position, pair[1].position);
            ConnectorView {
                from: pair[0].agent,
                to: pair[1].agent,
                path: curve.to_svg_path(),
                curve,
            }
        })
        .collect();

    Ok(BoardScene {
        size: board.layout().size,
        nodes,
        connectors,
    })
}

/// Render boundary for the board
pub fn render_board(board: &AssignmentBoard) -> Rendered {
    match compose_board(board) {
        Ok(scene) => Rendered::Scene(scene),
        Err(e) => {
            warn!(workspace_id = %board.workspace_id(), error = %e, "Board composition failed");
            Rendered::Fallback {
                message: "The board could not be drawn. Reload to try again.".to_string(),
                retryable: true,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub enabled: bool,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub state: WizardState,
    pub title: Option<String>,
    pub fields: Vec<FieldView>,
    pub can_commit: bool,
    /// Steps the user can jump to
    pub reachable: Vec<usize>,
    pub can_start: bool,
}

pub fn wizard_view(engine: &StepEngine) -> WizardView {
    let step = engine.current_step();
    let spec = step.and_then(|s| engine.spec(s));
    let draft = step.and_then(|s| engine.draft(s));

    let fields = spec
        .map(|spec| {
            spec.fields
                .iter()
                .map(|f| FieldView {
                    key: f.key.clone(),
                    label: f.label.clone(),
                    kind: f.kind.clone(),
                    required: f.required,
                    enabled: engine.field_enabled(&f.key),
                    value: draft.and_then(|d| d.get(&f.key).cloned()),
                })
                .collect()
        })
        .unwrap_or_default();

    WizardView {
        state: engine.state(),
        title: spec.map(|s| s.title.clone()),
        fields,
        can_commit: engine.can_commit(),
        reachable: (1..=engine.step_count())
            .filter(|s| engine.is_reachable(*s))
            .collect(),
        can_start: engine.all_committed() && !engine.is_started(),
    }
}

/// Everything the AI Workspace screen needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Screen {
    Onboarding(WizardView),
    Board(Rendered),
}

pub fn compose_screen(workspace: &Workspace, board: &AssignmentBoard, engine: &StepEngine) -> Screen {
    match view_mode(workspace) {
        ViewMode::Onboarding => Screen::Onboarding(wizard_view(engine)),
        ViewMode::Board => Screen::Board(render_board(board)),
    }
}
