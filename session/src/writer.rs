use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use workspace_core::{
    AgentKey, AssignmentBoard, AssignmentStore, PendingWrite, WorkspaceRepository,
};

/// Board state shared by the pollers, the writer and the view
pub type SharedBoard = Arc<Mutex<AssignmentBoard>>;

/// Manual assignment path: optimistic local update, then a single-field
/// upsert to the store.
///
/// No read-after-write confirmation; the next assignment poll is the
/// consistency mechanism. Two clients writing the same workspace resolve
/// last-write-wins at the store.
#[derive(Clone)]
pub struct AssignmentWriter {
    board: SharedBoard,
    store: Arc<dyn AssignmentStore>,
    mirror: Option<Arc<dyn WorkspaceRepository>>,
}

impl AssignmentWriter {
    pub fn new(board: SharedBoard, store: Arc<dyn AssignmentStore>) -> Self {
        Self {
            board,
            store,
            mirror: None,
        }
    }

    /// Also mirror accepted selections onto the local workspace record
    pub fn with_mirror(mut self, repo: Arc<dyn WorkspaceRepository>) -> Self {
        self.mirror = Some(repo);
        self
    }

    /// Assign `tool_name` to `agent`.
    ///
    /// Returns false, with no side effect, when the tool is not in the
    /// agent's allowed set. Store failures are logged and leave the
    /// optimistic local state in place.
    pub async fn assign(&self, agent: AgentKey, tool_name: &str) -> bool {
        let pending = self.board.lock().assign(agent, tool_name);
        match pending {
            Some(write) => {
                self.flush(write).await;
                true
            }
            None => false,
        }
    }

    /// Clear the agent's assignment; false if it had none
    pub async fn clear(&self, agent: AgentKey) -> bool {
        let pending = self.board.lock().clear(agent);
        match pending {
            Some(write) => {
                self.flush(write).await;
                true
            }
            None => false,
        }
    }

    async fn flush(&self, write: PendingWrite) {
        let tool_name = write.tool.map(|t| t.name());
        info!(
            workspace_id = %write.workspace_id,
            agent = %write.agent,
            tool = tool_name.unwrap_or("-"),
            "Assignment changed"
        );

        if let Err(e) = self
            .store
            .upsert_field(&write.workspace_id, write.agent, write.tool)
            .await
        {
            warn!(
                workspace_id = %write.workspace_id,
                agent = %write.agent,
                error = %e,
                "Assignment write failed; next poll will reconcile"
            );
        }

        if let Some(repo) = &self.mirror {
            if let Err(e) = repo
                .set_selection(&write.workspace_id, write.agent, tool_name)
                .await
            {
                warn!(workspace_id = %write.workspace_id, error = %e, "Selection mirror failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocks::{MockAssignmentStore, MockWorkspaceRepository, WorkspaceBuilder, TEST_CONTAINER};
    use workspace_core::{Tool, WorkspaceError, WorkspaceId};

    fn setup() -> (SharedBoard, MockAssignmentStore, AssignmentWriter) {
        let board = Arc::new(Mutex::new(AssignmentBoard::new(
            WorkspaceId::from("ws-test-001"),
            TEST_CONTAINER,
        )));
        let store = MockAssignmentStore::new();
        let writer = AssignmentWriter::new(board.clone(), Arc::new(store.clone()));
        (board, store, writer)
    }

    #[tokio::test]
    async fn test_assign_updates_board_and_store() {
        let (board, store, writer) = setup();

        assert!(writer.assign(AgentKey::Leo, "apollo").await);

        assert_eq!(board.lock().get(AgentKey::Leo).map(|a| a.tool), Some(Tool::Apollo));
        let row = store.row(&WorkspaceId::from("ws-test-001")).unwrap();
        assert_eq!(row.get(AgentKey::Leo), Some("Apollo"), "Stored with registry casing");
    }

    #[tokio::test]
    async fn test_invalid_tool_is_a_silent_noop() {
        let (board, store, writer) = setup();

        assert!(writer.assign(AgentKey::Leo, "Apollo").await);
        assert!(!writer.assign(AgentKey::Leo, "Gmail").await);

        assert_eq!(board.lock().get(AgentKey::Leo).map(|a| a.tool), Some(Tool::Apollo));
        assert_eq!(store.upserts().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_optimistic_state() {
        let (board, store, writer) = setup();
        store.inject_error(WorkspaceError::store("timeout"));

        assert!(writer.assign(AgentKey::Emma, "Notion").await);
        assert_eq!(board.lock().get(AgentKey::Emma).map(|a| a.tool), Some(Tool::Notion));
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_and_clear() {
        let (board, store, writer) = setup();
        let repo = MockWorkspaceRepository::with_workspaces(vec![WorkspaceBuilder::new().build()]);
        let writer = writer.with_mirror(Arc::new(repo.clone()));

        writer.assign(AgentKey::Sara, "Pipedrive").await;
        let id = WorkspaceId::from("ws-test-001");
        assert_eq!(
            repo.stored(&id).unwrap().selections.get(&AgentKey::Sara).map(String::as_str),
            Some("Pipedrive")
        );

        assert!(writer.clear(AgentKey::Sara).await);
        assert!(!writer.clear(AgentKey::Sara).await);
        assert!(board.lock().get(AgentKey::Sara).is_none());
        assert!(repo.stored(&id).unwrap().selections.is_empty());
        assert_eq!(store.row(&id).unwrap().get(AgentKey::Sara), None);
    }
}
