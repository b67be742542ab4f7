//! Mock implementation of WorkspaceRepository trait
//!
//! Provides a thread-safe mock repository with:
//! - Error injection capabilities
//! - Call tracking for verification
//! - The same validation rules as the SQLite repository

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use workspace_core::{
    AgentKey, FieldValidator, NewWorkspace, Result, Workspace, WorkspaceError, WorkspaceId,
    WorkspaceRepository,
};
use workspace_core::wizard::OnboardingRecord;

/// Mock implementation of WorkspaceRepository for testing
///
/// Features:
/// - Thread-safe concurrent access
/// - Error injection for failure testing
/// - Call history tracking for verification
#[derive(Clone)]
pub struct MockWorkspaceRepository {
    workspaces: Arc<Mutex<HashMap<WorkspaceId, Workspace>>>,
    error_injection: Arc<Mutex<Option<WorkspaceError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockWorkspaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorkspaceRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            workspaces: Arc::new(Mutex::new(HashMap::new())),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create mock repository with pre-populated workspaces
    pub fn with_workspaces(workspaces: Vec<Workspace>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.workspaces.lock();
            for workspace in workspaces {
                map.insert(workspace.id.clone(), workspace);
            }
        }
        repo
    }

    /// Snapshot of a stored workspace without recording a call
    pub fn stored(&self, id: &WorkspaceId) -> Option<Workspace> {
        self.workspaces.lock().get(id).cloned()
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: WorkspaceError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear error injection
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Assert method was never called
    pub fn assert_not_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            !history.iter().any(|call| call.starts_with(method)),
            "Method '{}' was called. Call history: {:?}",
            method,
            *history
        );
    }

    fn check_error_injection(&self) -> Result<()> {
        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }
        Ok(())
    }

    fn record_call(&self, method: &str) {
        self.call_history.lock().push(format!("{method}()"));
    }

    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }
}

#[async_trait]
impl WorkspaceRepository for MockWorkspaceRepository {
    async fn create(&self, workspace: NewWorkspace) -> Result<Workspace> {
        self.record_call_with_params("create", &format!("id={}", workspace.id));
        self.check_error_injection()?;

        FieldValidator::validate_workspace_name(&workspace.name)?;

        let mut workspaces = self.workspaces.lock();
        if workspaces.contains_key(&workspace.id) {
            return Err(WorkspaceError::Validation(
                "Workspace id already exists".to_string(),
            ));
        }

        // Keep creation order strictly increasing so `list` is deterministic
        let latest = workspaces.values().map(|w| w.created_at).max();
        let now = Utc::now();
        let created_at = match latest {
            Some(latest) if latest >= now => latest + Duration::milliseconds(1),
            _ => now,
        };

        let mut created = Workspace::new(workspace.name.trim());
        created.id = workspace.id;
        created.created_at = created_at;
        workspaces.insert(created.id.clone(), created.clone());

        Ok(created)
    }

    async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
        self.record_call_with_params("get", &format!("id={id}"));
        self.check_error_injection()?;

        Ok(self.workspaces.lock().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        self.record_call("list");
        self.check_error_injection()?;

        let mut result: Vec<Workspace> = self.workspaces.lock().values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn rename(&self, id: &WorkspaceId, name: &str) -> Result<Workspace> {
        self.record_call_with_params("rename", &format!("id={id}, name={name}"));
        self.check_error_injection()?;

        FieldValidator::validate_workspace_name(name)?;

        let mut workspaces = self.workspaces.lock();
        let workspace = workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))?;
        workspace.name = name.trim().to_string();
        Ok(workspace.clone())
    }

    async fn set_selection(
        &self,
        id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<&str>,
    ) -> Result<()> {
        self.record_call_with_params(
            "set_selection",
            &format!("id={id}, agent={agent}, tool={}", tool.unwrap_or("-")),
        );
        self.check_error_injection()?;

        let mut workspaces = self.workspaces.lock();
        let workspace = workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))?;
        match tool {
            Some(tool) => {
                workspace.selections.insert(agent, tool.to_string());
            }
            None => {
                workspace.selections.remove(&agent);
            }
        }
        Ok(())
    }

    async fn complete_onboarding(
        &self,
        id: &WorkspaceId,
        record: &OnboardingRecord,
    ) -> Result<Workspace> {
        self.record_call_with_params("complete_onboarding", &format!("id={id}"));
        self.check_error_injection()?;

        let mut workspaces = self.workspaces.lock();
        let workspace = workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))?;
        if !workspace.onboarding_completed {
            workspace.onboarding_completed = true;
            workspace.onboarding = Some(record.clone());
        }
        Ok(workspace.clone())
    }

    async fn delete(&self, id: &WorkspaceId) -> Result<()> {
        self.record_call_with_params("delete", &format!("id={id}"));
        self.check_error_injection()?;

        self.workspaces
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))
    }

    async fn health_check(&self) -> Result<()> {
        self.record_call("health_check");
        self.check_error_injection()?;

        // Mock always reports healthy
        Ok(())
    }
}
