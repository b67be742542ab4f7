//! Mock implementations and test utilities for the AI Workspace engine
//!
//! This crate provides the testing infrastructure shared by every member:
//! - In-memory implementations of all collaborator traits
//! - Realistic test data generators
//! - Custom assertion helpers
//! - Property-based testing strategies
//! - Contract test helpers

pub mod assertions;
pub mod builders;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod remote;
pub mod repository;

pub use assertions::*;
pub use builders::*;
pub use contracts::*;
pub use fixtures::*;
pub use generators::*;
pub use remote::{Delivery, MockAssignmentStore, MockMessageStore, MockWebhookSink};
pub use repository::MockWorkspaceRepository;
