//! Mock implementations of the remote collaborators
//!
//! - `MockAssignmentStore`: keyed assignment rows with partial upserts
//! - `MockMessageStore`: chat messages with strictly increasing timestamps
//! - `MockWebhookSink`: records deliveries, fails configured targets

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use workspace_core::{
    AgentKey, AssignmentRow, AssignmentStore, ChatMessage, MessageStore, Result, Tool,
    WebhookSink, WorkspaceError, WorkspaceId,
};

/// In-memory assignment store
///
/// Besides one-shot error injection the store can be switched offline
/// (every call fails until switched back) and given a per-call latency,
/// which lets tests observe responses that arrive after a session moved on.
#[derive(Clone, Default)]
pub struct MockAssignmentStore {
    rows: Arc<Mutex<HashMap<WorkspaceId, AssignmentRow>>>,
    error_injection: Arc<Mutex<Option<WorkspaceError>>>,
    offline: Arc<Mutex<bool>>,
    latency: Arc<Mutex<Option<std::time::Duration>>>,
    fetch_count: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<(WorkspaceId, AgentKey, Option<Tool>)>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with rows
    pub fn with_rows(rows: Vec<AssignmentRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.set_row(row);
        }
        store
    }

    /// Replace a row as if another client wrote it
    pub fn set_row(&self, row: AssignmentRow) {
        let id = WorkspaceId::from(row.workspace_id.clone());
        self.rows.lock().insert(id, row);
    }

    /// Drop a row entirely
    pub fn remove_row(&self, workspace_id: &WorkspaceId) {
        self.rows.lock().remove(workspace_id);
    }

    /// Current row without recording a call
    pub fn row(&self, workspace_id: &WorkspaceId) -> Option<AssignmentRow> {
        self.rows.lock().get(workspace_id).cloned()
    }

    pub fn inject_error(&self, error: WorkspaceError) {
        *self.error_injection.lock() = Some(error);
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    pub fn set_latency(&self, latency: Option<std::time::Duration>) {
        *self.latency.lock() = latency;
    }

    /// Number of `fetch` calls made so far, failed ones included
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Every `upsert_field` call that succeeded, oldest first
    pub fn upserts(&self) -> Vec<(WorkspaceId, AgentKey, Option<Tool>)> {
        self.upserts.lock().clone()
    }

    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    async fn simulate(&self, call: String) -> Result<()> {
        self.call_history.lock().push(call);

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }
        if *self.offline.lock() {
            return Err(WorkspaceError::store("service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for MockAssignmentStore {
    async fn fetch(&self, workspace_id: &WorkspaceId) -> Result<Option<AssignmentRow>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.simulate(format!("fetch(id={workspace_id})")).await?;
        Ok(self.rows.lock().get(workspace_id).cloned())
    }

    async fn upsert_field(
        &self,
        workspace_id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<Tool>,
    ) -> Result<()> {
        self.simulate(format!(
            "upsert_field(id={workspace_id}, agent={agent}, tool={})",
            tool.map(|t| t.name()).unwrap_or("-")
        ))
        .await?;

        let mut rows = self.rows.lock();
        let row = rows
            .entry(workspace_id.clone())
            .or_insert_with(|| AssignmentRow::empty(workspace_id));
        row.set(agent, tool.map(|t| t.name().to_string()));
        drop(rows);

        self.upserts.lock().push((workspace_id.clone(), agent, tool));
        Ok(())
    }

    async fn create_empty(&self, workspace_id: &WorkspaceId) -> Result<()> {
        self.simulate(format!("create_empty(id={workspace_id})")).await?;
        self.rows
            .lock()
            .entry(workspace_id.clone())
            .or_insert_with(|| AssignmentRow::empty(workspace_id));
        Ok(())
    }
}

/// In-memory chat message store
#[derive(Clone, Default)]
pub struct MockMessageStore {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    next_id: Arc<AtomicI64>,
    error_injection: Arc<Mutex<Option<WorkspaceError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; timestamps are strictly increasing per store
    pub fn push(&self, workspace_id: &WorkspaceId, author: &str, body: &str) -> ChatMessage {
        let now = Utc::now();
        let created_at: DateTime<Utc> = match self.messages.lock().last() {
            Some(last) if last.created_at >= now => last.created_at + Duration::milliseconds(1),
            _ => now,
        };
        self.push_at(workspace_id, author, body, created_at)
    }

    /// Append a message with an explicit timestamp
    pub fn push_at(
        &self,
        workspace_id: &WorkspaceId,
        author: &str,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> ChatMessage {
        let mut messages = self.messages.lock();
        let message = ChatMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            workspace_id: workspace_id.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            created_at,
        };
        messages.push(message.clone());
        message
    }

    pub fn inject_error(&self, error: WorkspaceError) {
        *self.error_injection.lock() = Some(error);
    }

    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }
}

#[async_trait]
impl MessageStore for MockMessageStore {
    async fn messages_since(
        &self,
        workspace_id: &WorkspaceId,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        self.call_history
            .lock()
            .push(format!("messages_since(id={workspace_id})"));
        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }

        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.workspace_id == workspace_id.as_str())
            .filter(|m| after.map_or(true, |after| m.created_at >= after))
            .cloned()
            .collect())
    }
}

/// A recorded webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub url: String,
    pub organization_id: String,
    pub body: serde_json::Value,
}

/// Webhook sink that records deliveries instead of sending them
#[derive(Clone, Default)]
pub struct MockWebhookSink {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    failing_urls: Arc<Mutex<HashSet<String>>>,
    error_injection: Arc<Mutex<Option<WorkspaceError>>>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl MockWebhookSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every POST to `url` fails until cleared
    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().insert(url.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_urls.lock().clear();
    }

    pub fn inject_error(&self, error: WorkspaceError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Successful deliveries, oldest first
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn delivered_urls(&self) -> Vec<String> {
        self.deliveries.lock().iter().map(|d| d.url.clone()).collect()
    }

    /// Every attempted URL, failed ones included
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl WebhookSink for MockWebhookSink {
    async fn post_json(
        &self,
        url: &str,
        organization_id: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        self.attempts.lock().push(url.to_string());

        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }
        if self.failing_urls.lock().contains(url) {
            return Err(WorkspaceError::notification(format!(
                "POST {url} failed with status 500"
            )));
        }

        self.deliveries.lock().push(Delivery {
            url: url.to_string(),
            organization_id: organization_id.to_string(),
            body: body.clone(),
        });
        Ok(())
    }
}
