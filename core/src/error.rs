use thiserror::Error;

/// Result type alias for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Error types for the AI Workspace engine.
///
/// Nothing in the engine is fatal: every variant degrades to "stale but
/// consistent local state". The predicates below let callers decide whether
/// an error should be logged and retried on the next tick, shown inline, or
/// raised as a transient alert.
///
/// # Examples
///
/// ```rust
/// use workspace_core::error::WorkspaceError;
///
/// let err = WorkspaceError::store("connection reset");
/// assert!(err.is_transient());
///
/// let err = WorkspaceError::empty_field("jobTitles");
/// assert!(err.is_validation());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// Record not found by the given identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error with details
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field cannot be edited until the field it depends on holds a valid option
    #[error("Field '{0}' is disabled until '{1}' is selected")]
    FieldDisabled(String, String),

    /// Wizard step index out of range or not yet reachable
    #[error("Step {0} is not reachable")]
    InvalidStep(usize),

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Remote assignment/message store failure (network, status, decode)
    #[error("Store error: {0}")]
    Store(String),

    /// Local durable storage failure
    #[error("Database error: {0}")]
    Database(String),

    /// Outbound notification failure
    #[error("Notification error: {0}")]
    Notification(String),

    /// Fault while composing the board scene
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkspaceError {
    /// Create a not found error for a workspace id
    pub fn workspace_not_found(id: &str) -> Self {
        Self::NotFound(format!("Workspace '{id}' not found"))
    }

    /// Create a validation error for an empty field
    pub fn empty_field(field: &str) -> Self {
        Self::Validation(format!("Field '{field}' cannot be empty"))
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkspaceError::NotFound(_))
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkspaceError::Validation(_) | WorkspaceError::FieldDisabled(_, _)
        )
    }

    /// Transient sync failures are logged and retried on the next interval
    pub fn is_transient(&self) -> bool {
        matches!(self, WorkspaceError::Store(_))
    }

    /// Failures that should surface as a transient user-visible alert
    pub fn is_alert(&self) -> bool {
        matches!(self, WorkspaceError::Notification(_))
    }
}
