//! AI Workspace command-line driver
//!
//! Configuration loading, telemetry and the wiring of the local workspace
//! database with the remote collaborators. The `ai-workspace` binary drives
//! the engine headlessly on top of this.

pub mod commands;
pub mod config;
pub mod setup;
pub mod telemetry;

pub use config::Config;
pub use setup::{create_collaborators, create_repository, ensure_database_directory, initialize_app, App};
pub use telemetry::init_telemetry;
