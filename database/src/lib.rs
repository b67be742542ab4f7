//! Database crate for the AI Workspace
//!
//! This crate provides the SQLite implementation of the WorkspaceRepository
//! trait: local durable storage for workspace records, their mirrored board
//! selections, and the onboarding record handed over by the intake wizard.
//!
//! # Usage
//!
//! ```rust
//! use database::SqliteWorkspaceRepository;
//! use workspace_core::repository::WorkspaceRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create repository (in-memory for testing)
//!     let repo = SqliteWorkspaceRepository::new(":memory:").await?;
//!
//!     // Run migrations
//!     repo.migrate().await?;
//!
//!     repo.health_check().await?;
//!     Ok(())
//! }
//! ```

mod common;
mod sqlite;

pub use sqlite::SqliteWorkspaceRepository;

// Re-export commonly used types from workspace-core for convenience
pub use workspace_core::{
    error::{Result, WorkspaceError},
    models::{NewWorkspace, Workspace, WorkspaceId},
    repository::WorkspaceRepository,
};
