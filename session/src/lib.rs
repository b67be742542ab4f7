//! Workspace Session
//!
//! Runtime side of the AI Workspace screen: the periodic sync with the
//! remote assignment and message stores, the optimistic write path, the
//! onboarding notifications, and the debounced layout observers. One
//! [`WorkspaceSession`] owns at most one active workspace at a time.
//!
//! # Architecture
//!
//! - [`poller`] - Interval loop with an active flag checked before any apply
//! - [`debounce`] - Quiet-period collapse of resize and sidebar bursts
//! - [`writer`] - Manual assignment: local update, then single-field upsert
//! - [`sync`] - Assignment snapshot poll and chat mention poll
//! - [`onboarding`] - Wizard commits with step and aggregate notifications
//! - [`session`] - Activation lifecycle tying the above together

pub mod debounce;
pub mod onboarding;
pub mod poller;
pub mod session;
pub mod sync;
pub mod writer;

pub use debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
pub use onboarding::{CommitReport, DeliveryReport, NotificationTargets, OnboardingFlow, StartReport};
pub use poller::{spawn_poller, ActiveFlag, PollTask, PollerHandle};
pub use session::{Collaborators, SessionConfig, WorkspaceSession};
pub use sync::{AssignmentSync, ChatSync};
pub use writer::{AssignmentWriter, SharedBoard};
