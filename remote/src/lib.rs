//! HTTP adapters for the AI Workspace collaborators
//!
//! - [`RestAssignmentStore`] and [`RestMessageStore`] speak the PostgREST
//!   dialect of the hosted data service.
//! - [`HttpWebhookSink`] posts onboarding notifications to the workflow
//!   runner.
//!
//! Every failure surfaces as a `WorkspaceError`; nothing here retries.
//! Callers poll again on the next tick.

mod assignments;
mod client;
mod messages;
mod webhook;

pub use assignments::RestAssignmentStore;
pub use client::{RestClient, RestConfig};
pub use messages::RestMessageStore;
pub use webhook::{HttpWebhookSink, ORGANIZATION_HEADER};
