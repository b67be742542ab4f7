//! Workspace Core Library
//!
//! This crate provides the domain models, pure engines, and collaborator
//! trait interfaces behind the AI Workspace screen. All other crates depend
//! on the types and interfaces defined here.
//!
//! # Architecture
//!
//! - [`roster`] - Fixed agent rosters and the closed tool registry
//! - [`models`] - Workspace, assignment, and store row types
//! - [`geometry`] - Zigzag node placement and S-curve connectors
//! - [`board`] - Local assignment state, reconciliation, optimistic writes
//! - [`wizard`] - Multi-step intake wizard state machine
//! - [`view`] - Screen composition and the board render boundary
//! - [`mention`] - `@agent tool` chat mentions
//! - [`repository`] - Traits for the stores and outbound webhooks
//! - [`validation`] - Field validation utilities
//! - [`error`] - Error types and result handling
//!
//! # Example
//!
//! ```rust
//! use workspace_core::{AgentKey, AssignmentBoard, ContainerSize, Tool, WorkspaceId};
//!
//! let mut board = AssignmentBoard::new(WorkspaceId::from("demo"), ContainerSize::new(800.0, 480.0));
//!
//! // Allowed tool: applied locally and returned as a pending store write
//! assert!(board.assign(AgentKey::Leo, "apollo").is_some());
//! // Not in leo's set: silently ignored
//! assert!(board.assign(AgentKey::Leo, "Gmail").is_none());
//! assert_eq!(board.get(AgentKey::Leo).unwrap().tool, Tool::Apollo);
//! ```

pub mod board;
pub mod error;
pub mod geometry;
pub mod mention;
pub mod models;
pub mod repository;
pub mod roster;
pub mod validation;
pub mod view;
pub mod wizard;

// Re-export commonly used types at the crate root for convenience
pub use board::{reconcile, AssignmentBoard, PendingWrite, ReconcileOutcome};
pub use error::{Result, WorkspaceError};
pub use geometry::{compute_connector, compute_positions, Connector, Layout};
pub use mention::{parse_mentions, Mention};
pub use models::{
    Assignment, AssignmentMap, AssignmentRow, ChatMessage, ContainerSize, NewWorkspace, Point,
    SidebarState, Workspace, WorkspaceId,
};
pub use repository::{AssignmentStore, MessageStore, WebhookSink, WorkspaceRepository};
pub use roster::{AgentKey, Tool, BOARD_ROSTER, CHAT_ROSTER};
pub use validation::FieldValidator;
pub use view::{
    compose_board, compose_screen, render_board, view_mode, BoardScene, Rendered, Screen,
    ViewMode, WizardView,
};
pub use wizard::{
    intake_steps, FieldKind, FieldSpec, OnboardingRecord, StepCommit, StepEngine, StepPayload,
    StepSpec, WizardState,
};

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
