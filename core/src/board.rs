//! Local assignment state for one open workspace.
//!
//! The board owns the `{agent -> (tool, position)}` map. Remote snapshots are
//! folded in with [`reconcile`]; manual assignments go through
//! [`AssignmentBoard::assign`], which updates the map optimistically and
//! returns the write that still has to reach the store.

use std::collections::BTreeMap;
use tracing::debug;

use crate::geometry::{compute_connector, compute_positions, Connector, Layout};
use crate::models::{Assignment, AssignmentMap, AssignmentRow, ContainerSize, WorkspaceId};
use crate::roster::{AgentKey, Tool, BOARD_ROSTER};

/// Fold a remote snapshot into the previous local map.
///
/// Only agents with a non-null remote value that resolves against their
/// allowed tools survive; anything else is dropped without error. An agent
/// whose tool is unchanged keeps its previous position exactly, every other
/// agent gets its position from `layout`.
pub fn reconcile(previous: &AssignmentMap, snapshot: &AssignmentRow, layout: &Layout) -> AssignmentMap {
    let mut next = AssignmentMap::new();

    for agent in BOARD_ROSTER {
        let Some(raw) = snapshot.get(agent) else {
            continue;
        };
        let Some(tool) = agent.resolve_tool(raw) else {
            debug!(agent = %agent, value = raw, "Dropping tool not allowed for agent");
            continue;
        };

        let position = match previous.get(&agent) {
            Some(prev) if prev.tool == tool => prev.position,
            _ => layout.position(agent).unwrap_or_default(),
        };
        next.insert(agent, Assignment { agent, tool, position });
    }

    next
}

/// Summary of what a reconciliation changed, for logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: Vec<AgentKey>,
    pub changed: Vec<AgentKey>,
    pub removed: Vec<AgentKey>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    fn diff(before: &AssignmentMap, after: &AssignmentMap) -> Self {
        let mut outcome = Self::default();
        for agent in BOARD_ROSTER {
            match (before.get(&agent), after.get(&agent)) {
                (None, Some(_)) => outcome.added.push(agent),
                (Some(_), None) => outcome.removed.push(agent),
                (Some(old), Some(new)) if old.tool != new.tool => outcome.changed.push(agent),
                _ => {}
            }
        }
        outcome
    }
}

/// Single-field write produced by a manual assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub workspace_id: WorkspaceId,
    pub agent: AgentKey,
    /// `None` clears the agent's field
    pub tool: Option<Tool>,
}

/// Assignment state of the open workspace
#[derive(Debug, Clone)]
pub struct AssignmentBoard {
    workspace_id: WorkspaceId,
    layout: Layout,
    assignments: AssignmentMap,
}

impl AssignmentBoard {
    pub fn new(workspace_id: WorkspaceId, size: ContainerSize) -> Self {
        Self {
            workspace_id,
            layout: compute_positions(size, &BOARD_ROSTER),
            assignments: AssignmentMap::new(),
        }
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    pub fn get(&self, agent: AgentKey) -> Option<&Assignment> {
        self.assignments.get(&agent)
    }

    /// Replace the local map with a remote snapshot
    pub fn apply_snapshot(&mut self, snapshot: &AssignmentRow) -> ReconcileOutcome {
        let next = reconcile(&self.assignments, snapshot, &self.layout);
        let outcome = ReconcileOutcome::diff(&self.assignments, &next);
        self.assignments = next;
        outcome
    }

    /// Optimistically assign `tool_name` to `agent`.
    ///
    /// Returns `None`, leaving the board untouched, when the tool is not in
    /// the agent's allowed set. The existing position of the agent is kept.
    pub fn assign(&mut self, agent: AgentKey, tool_name: &str) -> Option<PendingWrite> {
        let Some(tool) = agent.resolve_tool(tool_name) else {
            debug!(agent = %agent, tool = tool_name, "Ignoring assignment outside allowed set");
            return None;
        };

        let position = self
            .assignments
            .get(&agent)
            .map(|existing| existing.position)
            .or_else(|| self.layout.position(agent))
            .unwrap_or_default();
        self.assignments
            .insert(agent, Assignment { agent, tool, position });

        Some(PendingWrite {
            workspace_id: self.workspace_id.clone(),
            agent,
            tool: Some(tool),
        })
    }

    /// Optimistically clear the agent's assignment
    pub fn clear(&mut self, agent: AgentKey) -> Option<PendingWrite> {
        self.assignments.remove(&agent)?;
        Some(PendingWrite {
            workspace_id: self.workspace_id.clone(),
            agent,
            tool: None,
        })
    }

    /// Recompute geometry for a new container size; every node moves
    pub fn relayout(&mut self, size: ContainerSize) {
        self.layout = compute_positions(size, &BOARD_ROSTER);
        for (agent, assignment) in self.assignments.iter_mut() {
            assignment.position = self.layout.position(*agent).unwrap_or_default();
        }
    }

    /// Connectors between consecutive assigned agents, in roster order
    pub fn connectors(&self) -> Vec<(AgentKey, AgentKey, Connector)> {
        let assigned: Vec<&Assignment> = BOARD_ROSTER
            .iter()
            .filter_map(|agent| self.assignments.get(agent))
            .collect();

        assigned
            .windows(2)
            .map(|pair| {
                (
                    pair[0].agent,
                    pair[1].agent,
                    compute_connector(pair[0].position, pair[1].position),
                )
            })
            .collect()
    }

    /// Canonical tool names by agent, mirrored onto the workspace record
    pub fn selections(&self) -> BTreeMap<AgentKey, String> {
        self.assignments
            .iter()
            .map(|(agent, a)| (*agent, a.tool.name().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn board() -> AssignmentBoard {
        AssignmentBoard::new(WorkspaceId::from("ws-1"), ContainerSize::new(800.0, 480.0))
    }

    fn row() -> AssignmentRow {
        AssignmentRow::empty(&WorkspaceId::from("ws-1"))
    }

    #[test]
    fn test_reconcile_keeps_position_when_tool_unchanged() {
        let mut board = board();
        board.apply_snapshot(&row().with(AgentKey::Leo, "Apollo"));

        let moved = Point::new(12.0, 34.0);
        board.assignments.get_mut(&AgentKey::Leo).unwrap().position = moved;

        board.apply_snapshot(&row().with(AgentKey::Leo, "Apollo"));
        assert_eq!(board.get(AgentKey::Leo).unwrap().position, moved);
    }

    #[test]
    fn test_reconcile_recomputes_position_when_tool_changes() {
        let mut board = board();
        board.apply_snapshot(&row().with(AgentKey::Leo, "Apollo"));
        board.assignments.get_mut(&AgentKey::Leo).unwrap().position = Point::new(1.0, 1.0);

        let outcome = board.apply_snapshot(&row().with(AgentKey::Leo, "Clay"));
        let fresh = compute_positions(ContainerSize::new(800.0, 480.0), &BOARD_ROSTER)
            .position(AgentKey::Leo)
            .unwrap();
        assert_eq!(board.get(AgentKey::Leo).unwrap().position, fresh);
        assert_eq!(board.get(AgentKey::Leo).unwrap().tool, Tool::Clay);
        assert_eq!(outcome.changed, vec![AgentKey::Leo]);
    }

    #[test]
    fn test_reconcile_drops_invalid_and_missing() {
        let mut board = board();
        let outcome = board.apply_snapshot(
            &row()
                .with(AgentKey::Leo, "Gmail")
                .with(AgentKey::Mike, "gmail")
                .with(AgentKey::Sara, ""),
        );
        assert!(board.get(AgentKey::Leo).is_none());
        assert!(board.get(AgentKey::Sara).is_none());
        assert_eq!(board.get(AgentKey::Mike).unwrap().tool, Tool::Gmail);
        assert_eq!(outcome.added, vec![AgentKey::Mike]);

        let outcome = board.apply_snapshot(&row());
        assert!(board.assignments().is_empty());
        assert_eq!(outcome.removed, vec![AgentKey::Mike]);
    }

    #[test]
    fn test_assign_invalid_tool_is_noop() {
        let mut board = board();
        assert!(board.assign(AgentKey::Leo, "Apollo").is_some());
        let before = board.assignments().clone();

        assert!(board.assign(AgentKey::Leo, "Gmail").is_none());
        assert_eq!(board.assignments(), &before);
        assert_eq!(board.get(AgentKey::Leo).unwrap().tool, Tool::Apollo);
    }

    #[test]
    fn test_assign_returns_canonical_write_and_keeps_position() {
        let mut board = board();
        board.assign(AgentKey::Emma, "slack");
        let custom = Point::new(5.0, 6.0);
        board.assignments.get_mut(&AgentKey::Emma).unwrap().position = custom;

        let write = board.assign(AgentKey::Emma, "google sheets").unwrap();
        assert_eq!(write.tool, Some(Tool::GoogleSheets));
        assert_eq!(write.tool.unwrap().name(), "Google Sheets");
        assert_eq!(write.workspace_id.as_str(), "ws-1");
        assert_eq!(board.get(AgentKey::Emma).unwrap().position, custom);
    }

    #[test]
    fn test_clear() {
        let mut board = board();
        assert!(board.clear(AgentKey::Nina).is_none());
        board.assign(AgentKey::Nina, "Zoom");
        let write = board.clear(AgentKey::Nina).unwrap();
        assert_eq!(write.tool, None);
        assert!(board.get(AgentKey::Nina).is_none());
    }

    #[test]
    fn test_connectors_follow_roster_order() {
        let mut board = board();
        board.assign(AgentKey::Emma, "Slack");
        assert!(board.connectors().is_empty());

        board.assign(AgentKey::Sara, "HubSpot");
        board.assign(AgentKey::Leo, "Apollo");

        let pairs: Vec<(AgentKey, AgentKey)> =
            board.connectors().iter().map(|(a, b, _)| (*a, *b)).collect();
        assert_eq!(
            pairs,
            vec![(AgentKey::Leo, AgentKey::Sara), (AgentKey::Sara, AgentKey::Emma)]
        );
    }

    #[test]
    fn test_relayout_moves_assigned_nodes() {
        let mut board = board();
        board.assign(AgentKey::Mike, "Outlook");
        let before = board.get(AgentKey::Mike).unwrap().position;

        board.relayout(ContainerSize::new(1200.0, 600.0));
        let after = board.get(AgentKey::Mike).unwrap().position;
        assert_ne!(before, after);
        assert_eq!(Some(after), board.layout().position(AgentKey::Mike));
    }

    #[test]
    fn test_render_boundary_falls_back_on_bad_geometry() {
        let mut board = board();
        board.assign(AgentKey::Leo, "Apollo");
        board.assignments.get_mut(&AgentKey::Leo).unwrap().position = Point::new(f64::NAN, 0.0);

        assert!(crate::view::compose_board(&board).is_err());
        match crate::view::render_board(&board) {
            crate::view::Rendered::Fallback { retryable, .. } => assert!(retryable),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_selections_use_registry_casing() {
        let mut board = board();
        board.assign(AgentKey::Sara, "hubspot");
        assert_eq!(
            board.selections().get(&AgentKey::Sara).map(String::as_str),
            Some("HubSpot")
        );
    }
}
