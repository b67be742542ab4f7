//! Poll tasks for an active workspace: the assignment row and the chat
//! panel messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workspace_core::{
    parse_mentions, AssignmentRow, AssignmentStore, MessageStore, WorkspaceId,
    WorkspaceRepository,
};

use crate::poller::{ActiveFlag, PollTask};
use crate::writer::{AssignmentWriter, SharedBoard};
use workspace_core::error::Result;

/// Pulls the remote assignment row and folds it into the board.
///
/// A missing row means nobody has an assignment yet; the first time that
/// happens for an activation an empty row is created.
pub struct AssignmentSync {
    workspace_id: WorkspaceId,
    store: Arc<dyn AssignmentStore>,
    board: SharedBoard,
    mirror: Option<Arc<dyn WorkspaceRepository>>,
    row_ensured: bool,
}

impl AssignmentSync {
    pub fn new(workspace_id: WorkspaceId, store: Arc<dyn AssignmentStore>, board: SharedBoard) -> Self {
        Self {
            workspace_id,
            store,
            board,
            mirror: None,
            row_ensured: false,
        }
    }

    pub fn with_mirror(mut self, repo: Arc<dyn WorkspaceRepository>) -> Self {
        self.mirror = Some(repo);
        self
    }

    async fn ensure_row(&mut self) {
        if self.row_ensured {
            return;
        }
        match self.store.create_empty(&self.workspace_id).await {
            Ok(()) => {
                info!(workspace_id = %self.workspace_id, "Created empty assignment row");
                self.row_ensured = true;
            }
            Err(e) => warn!(workspace_id = %self.workspace_id, error = %e, "Could not create assignment row"),
        }
    }
}

#[async_trait]
impl PollTask for AssignmentSync {
    fn name(&self) -> &'static str {
        "assignments"
    }

    async fn poll(&mut self, active: &ActiveFlag) -> Result<()> {
        let snapshot = match self.store.fetch(&self.workspace_id).await? {
            Some(row) => {
                self.row_ensured = true;
                row
            }
            None => {
                self.ensure_row().await;
                AssignmentRow::empty(&self.workspace_id)
            }
        };

        if !active.is_active() {
            debug!(workspace_id = %self.workspace_id, "Discarding snapshot that arrived after teardown");
            return Ok(());
        }

        let (outcome, selections) = {
            let mut board = self.board.lock();
            let outcome = board.apply_snapshot(&snapshot);
            (outcome, board.selections())
        };
        if outcome.is_noop() {
            return Ok(());
        }

        info!(
            workspace_id = %self.workspace_id,
            added = ?outcome.added,
            changed = ?outcome.changed,
            removed = ?outcome.removed,
            "Applied remote assignments"
        );

        if let Some(repo) = &self.mirror {
            let touched = outcome
                .added
                .iter()
                .chain(&outcome.changed)
                .chain(&outcome.removed);
            for agent in touched {
                let tool = selections.get(agent).map(String::as_str);
                if let Err(e) = repo.set_selection(&self.workspace_id, *agent, tool).await {
                    warn!(workspace_id = %self.workspace_id, error = %e, "Selection mirror failed");
                }
            }
        }
        Ok(())
    }
}

/// Watches the chat panel for `@agent tool` mentions and turns them into
/// assignments.
///
/// The first successful poll records the existing history as seen without
/// acting on it; only messages that arrive while the workspace is active
/// produce assignments.
pub struct ChatSync {
    workspace_id: WorkspaceId,
    messages: Arc<dyn MessageStore>,
    writer: AssignmentWriter,
    seen: HashSet<i64>,
    cursor: Option<DateTime<Utc>>,
    baseline_taken: bool,
}

impl ChatSync {
    pub fn new(workspace_id: WorkspaceId, messages: Arc<dyn MessageStore>, writer: AssignmentWriter) -> Self {
        Self {
            workspace_id,
            messages,
            writer,
            seen: HashSet::new(),
            cursor: None,
            baseline_taken: false,
        }
    }
}

#[async_trait]
impl PollTask for ChatSync {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn poll(&mut self, active: &ActiveFlag) -> Result<()> {
        let batch = self
            .messages
            .messages_since(&self.workspace_id, self.cursor)
            .await?;

        if !active.is_active() {
            debug!(workspace_id = %self.workspace_id, "Discarding messages that arrived after teardown");
            return Ok(());
        }

        let act = self.baseline_taken;
        self.baseline_taken = true;

        for message in batch {
            if !self.seen.insert(message.id) {
                continue;
            }
            self.cursor = Some(self.cursor.map_or(message.created_at, |c| c.max(message.created_at)));
            if !act {
                continue;
            }

            for mention in parse_mentions(&message.body) {
                let applied = self.writer.assign(mention.agent, &mention.tool_name).await;
                debug!(
                    message_id = message.id,
                    agent = %mention.agent,
                    tool = %mention.tool_name,
                    applied,
                    "Chat mention"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::spawn_poller;
    use mocks::{create_full_row, create_stale_row, MockAssignmentStore, MockMessageStore, TEST_CONTAINER};
    use parking_lot::Mutex;
    use std::time::Duration;
    use workspace_core::{AgentKey, AssignmentBoard, Tool, WorkspaceError};

    fn board(id: &WorkspaceId) -> SharedBoard {
        Arc::new(Mutex::new(AssignmentBoard::new(id.clone(), TEST_CONTAINER)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_row_is_created_once() {
        let id = WorkspaceId::from("ws-1");
        let store = MockAssignmentStore::new();
        let shared = board(&id);
        let _poller = spawn_poller(
            AssignmentSync::new(id.clone(), Arc::new(store.clone()), shared.clone()),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(store.fetch_count(), 3);
        let creates = store
            .call_history()
            .iter()
            .filter(|c| c.starts_with("create_empty"))
            .count();
        assert_eq!(creates, 1);
        assert!(shared.lock().assignments().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_keeps_assignments() {
        let id = WorkspaceId::from("ws-1");
        let store = MockAssignmentStore::with_rows(vec![create_full_row(&id)]);
        let shared = board(&id);
        let _poller = spawn_poller(
            AssignmentSync::new(id.clone(), Arc::new(store.clone()), shared.clone()),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(shared.lock().assignments().len(), 6);

        store.set_offline(true);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(shared.lock().assignments().len(), 6);

        store.set_offline(false);
        store.set_row(create_stale_row(&id));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(shared.lock().assignments().len(), 1);
        assert_eq!(shared.lock().get(AgentKey::Sara).map(|a| a.tool), Some(Tool::HubSpot));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_snapshot_is_discarded() {
        let id = WorkspaceId::from("ws-1");
        let store = MockAssignmentStore::new();
        store.set_latency(Some(Duration::from_secs(5)));
        let shared = board(&id);
        let poller = spawn_poller(
            AssignmentSync::new(id.clone(), Arc::new(store.clone()), shared.clone()),
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        store.set_row(create_full_row(&id));
        poller.stop();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.fetch_count(), 1);
        assert!(shared.lock().assignments().is_empty());
        assert!(poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_mentions_after_baseline_become_assignments() {
        let id = WorkspaceId::from("ws-1");
        let store = MockAssignmentStore::new();
        let messages = MockMessageStore::new();
        let shared = board(&id);
        let writer = AssignmentWriter::new(shared.clone(), Arc::new(store.clone()));

        messages.push(&id, "ana", "@leo apollo");

        let _poller = spawn_poller(
            ChatSync::new(id.clone(), Arc::new(messages.clone()), writer),
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(shared.lock().assignments().is_empty(), "History is not replayed");

        messages.push(&id, "ana", "@Mike use lemlist\n@alex twitter");
        messages.push(&id, "bob", "@emma: Google Sheets");
        tokio::time::sleep(Duration::from_secs(1)).await;

        let board = shared.lock();
        assert_eq!(board.get(AgentKey::Mike).map(|a| a.tool), Some(Tool::Lemlist));
        assert_eq!(board.get(AgentKey::Emma).map(|a| a.tool), Some(Tool::GoogleSheets));
        assert!(board.get(AgentKey::Alex).is_none(), "Board-only agent is not addressable from chat");
        assert!(board.get(AgentKey::Leo).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_sharing_cursor_timestamp_is_applied_once() {
        let id = WorkspaceId::from("ws-1");
        let messages = MockMessageStore::new();
        let shared = board(&id);
        let writer = AssignmentWriter::new(shared.clone(), Arc::new(MockAssignmentStore::new()));

        let at = Utc::now();
        messages.push_at(&id, "ana", "kickoff", at);
        let _poller = spawn_poller(
            ChatSync::new(id.clone(), Arc::new(messages.clone()), writer),
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        messages.push_at(&id, "bob", "@mike lemlist", at);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(shared.lock().get(AgentKey::Mike).map(|a| a.tool), Some(Tool::Lemlist));

        // Both rows keep coming back on later polls and must not be replayed
        let _ = shared.lock().clear(AgentKey::Mike);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(shared.lock().get(AgentKey::Mike).is_none());
        assert_eq!(messages.call_history().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_failure_is_retried() {
        let id = WorkspaceId::from("ws-1");
        let messages = MockMessageStore::new();
        let shared = board(&id);
        let writer = AssignmentWriter::new(shared.clone(), Arc::new(MockAssignmentStore::new()));

        messages.inject_error(WorkspaceError::store("reset"));
        let _poller = spawn_poller(
            ChatSync::new(id.clone(), Arc::new(messages.clone()), writer),
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Baseline taken on the second, successful poll
        tokio::time::sleep(Duration::from_secs(1)).await;
        messages.push(&id, "ana", "@nina zoom");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(shared.lock().get(AgentKey::Nina).map(|a| a.tool), Some(Tool::Zoom));
        assert_eq!(messages.call_history().len(), 3);
    }
}
