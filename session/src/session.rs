//! Lifecycle of the workspace the user has open.
//!
//! Activation loads the workspace record, builds a fresh board and starts
//! exactly one assignment poller, one chat poller and the two layout
//! debouncers. Deactivation, or switching to another workspace, tears all
//! of them down; responses still in flight for the old activation are
//! discarded by the pollers' active flags.
//!
//! Wizard progress survives switching: the step engine of a workspace that
//! is still onboarding is parked on deactivation and resumed on the next
//! activation of the same id, for the lifetime of the session.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use workspace_core::error::{Result, WorkspaceError};
use workspace_core::view::{compose_screen, render_board, Rendered, Screen};
use workspace_core::{
    AgentKey, AssignmentBoard, AssignmentStore, ContainerSize, MessageStore, SidebarState,
    StepEngine, WebhookSink, Workspace, WorkspaceId, WorkspaceRepository,
};

use crate::debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
use crate::onboarding::{CommitReport, NotificationTargets, OnboardingFlow, StartReport};
use crate::poller::{spawn_poller, PollerHandle};
use crate::sync::{AssignmentSync, ChatSync};
use crate::writer::{AssignmentWriter, SharedBoard};

/// Timing and notification settings for sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub assignment_poll_interval: Duration,
    pub message_poll_interval: Duration,
    pub layout_quiet_period: Duration,
    pub notifications: NotificationTargets,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assignment_poll_interval: Duration::from_secs(5),
            message_poll_interval: Duration::from_secs(3),
            layout_quiet_period: DEFAULT_QUIET_PERIOD,
            notifications: NotificationTargets::default(),
        }
    }
}

/// Every external collaborator a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub assignments: Arc<dyn AssignmentStore>,
    pub messages: Arc<dyn MessageStore>,
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub webhooks: Arc<dyn WebhookSink>,
}

struct Activation {
    workspace: Workspace,
    board: SharedBoard,
    viewport: Arc<Mutex<ContainerSize>>,
    writer: AssignmentWriter,
    onboarding: OnboardingFlow,
    assignment_poller: PollerHandle,
    chat_poller: PollerHandle,
    resize: Debouncer<ContainerSize>,
    sidebar: Debouncer<SidebarState>,
}

/// Single open workspace with its pollers and layout observers
pub struct WorkspaceSession {
    config: SessionConfig,
    deps: Collaborators,
    sidebar: watch::Sender<SidebarState>,
    active: Option<Activation>,
    parked_wizards: HashMap<WorkspaceId, StepEngine>,
}

fn board_size(viewport: ContainerSize, sidebar: SidebarState) -> ContainerSize {
    ContainerSize::new(sidebar.board_width(viewport.width), viewport.height)
}

impl WorkspaceSession {
    pub fn new(config: SessionConfig, deps: Collaborators) -> Self {
        let (sidebar, _) = watch::channel(SidebarState::default());
        Self {
            config,
            deps,
            sidebar,
            active: None,
            parked_wizards: HashMap::new(),
        }
    }

    /// Open `id` inside a viewport of the given size, closing whatever
    /// was open before
    pub async fn activate(&mut self, id: &WorkspaceId, viewport: ContainerSize) -> Result<()> {
        let workspace = self
            .deps
            .workspaces
            .get(id)
            .await?
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))?;

        self.deactivate();

        let size = board_size(viewport, *self.sidebar.borrow());
        let board: SharedBoard = Arc::new(Mutex::new(AssignmentBoard::new(id.clone(), size)));
        let viewport = Arc::new(Mutex::new(viewport));

        let writer = AssignmentWriter::new(board.clone(), self.deps.assignments.clone())
            .with_mirror(self.deps.workspaces.clone());

        let assignment_poller = spawn_poller(
            AssignmentSync::new(id.clone(), self.deps.assignments.clone(), board.clone())
                .with_mirror(self.deps.workspaces.clone()),
            self.config.assignment_poll_interval,
        );
        let chat_poller = spawn_poller(
            ChatSync::new(id.clone(), self.deps.messages.clone(), writer.clone()),
            self.config.message_poll_interval,
        );

        let resize = {
            let board = board.clone();
            let viewport = viewport.clone();
            let sidebar = self.sidebar.subscribe();
            Debouncer::spawn(self.config.layout_quiet_period, move |next: ContainerSize| {
                *viewport.lock() = next;
                let size = board_size(next, *sidebar.borrow());
                board.lock().relayout(size);
                debug!(width = size.width, height = size.height, "Board relayout after resize");
            })
        };

        let sidebar = {
            let board = board.clone();
            let viewport = viewport.clone();
            Debouncer::spawn(self.config.layout_quiet_period, move |state: SidebarState| {
                let size = board_size(*viewport.lock(), state);
                board.lock().relayout(size);
                debug!(open = state.open, width = size.width, "Board relayout after sidebar change");
            })
        };

        let engine = match self.parked_wizards.remove(id) {
            Some(engine) if !workspace.onboarding_completed => {
                debug!(workspace_id = %id, state = ?engine.state(), "Resuming wizard progress");
                engine
            }
            _ => StepEngine::intake(),
        };
        let onboarding = OnboardingFlow::with_engine(
            id.clone(),
            engine,
            self.deps.webhooks.clone(),
            self.deps.workspaces.clone(),
            self.config.notifications.clone(),
        );

        info!(workspace_id = %id, onboarding_completed = workspace.onboarding_completed, "Workspace activated");
        self.active = Some(Activation {
            workspace,
            board,
            viewport,
            writer,
            onboarding,
            assignment_poller,
            chat_poller,
            resize,
            sidebar,
        });
        Ok(())
    }

    /// Close the open workspace, if any. Idempotent.
    ///
    /// Pollers are signalled rather than aborted; a request already in
    /// flight completes and its result is dropped.
    pub fn deactivate(&mut self) {
        if let Some(activation) = self.active.take() {
            activation.assignment_poller.stop();
            activation.chat_poller.stop();
            activation.resize.dispose();
            activation.sidebar.dispose();
            if !activation.workspace.onboarding_completed {
                self.parked_wizards.insert(
                    activation.workspace.id.clone(),
                    activation.onboarding.into_engine(),
                );
            }
            info!(workspace_id = %activation.workspace.id, "Workspace deactivated");
        }
    }

    pub fn active_id(&self) -> Option<&WorkspaceId> {
        self.active.as_ref().map(|a| &a.workspace.id)
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.active.as_ref().map(|a| &a.workspace)
    }

    /// Report a new viewport size; recomputation is debounced
    pub fn resize(&self, viewport: ContainerSize) {
        if let Some(active) = &self.active {
            active.resize.push(viewport);
        }
    }

    /// Publish the sidebar state; the board follows after the quiet period
    pub fn set_sidebar(&self, state: SidebarState) {
        self.sidebar.send_replace(state);
        if let Some(active) = &self.active {
            active.sidebar.push(state);
        }
    }

    pub fn sidebar(&self) -> watch::Receiver<SidebarState> {
        self.sidebar.subscribe()
    }

    /// Manual assignment from the board; false when ignored
    pub async fn assign(&self, agent: AgentKey, tool_name: &str) -> Result<bool> {
        let writer = self.writer()?;
        Ok(writer.assign(agent, tool_name).await)
    }

    pub async fn clear(&self, agent: AgentKey) -> Result<bool> {
        let writer = self.writer()?;
        Ok(writer.clear(agent).await)
    }

    fn writer(&self) -> Result<AssignmentWriter> {
        self.active
            .as_ref()
            .map(|a| a.writer.clone())
            .ok_or_else(no_active_workspace)
    }

    /// Copy of the current board state
    pub fn board(&self) -> Option<AssignmentBoard> {
        self.active.as_ref().map(|a| a.board.lock().clone())
    }

    pub fn viewport(&self) -> Option<ContainerSize> {
        self.active.as_ref().map(|a| *a.viewport.lock())
    }

    /// Board scene, or a fallback when composition fails
    pub fn render(&self) -> Option<Rendered> {
        self.active.as_ref().map(|a| render_board(&a.board.lock()))
    }

    /// Wizard or board, depending on the workspace's onboarding flag
    pub fn screen(&self) -> Option<Screen> {
        self.active.as_ref().map(|a| {
            let board = a.board.lock();
            compose_screen(&a.workspace, &board, a.onboarding.engine())
        })
    }

    pub fn onboarding(&self) -> Option<&OnboardingFlow> {
        self.active.as_ref().map(|a| &a.onboarding)
    }

    pub fn onboarding_mut(&mut self) -> Result<&mut OnboardingFlow> {
        self.active
            .as_mut()
            .map(|a| &mut a.onboarding)
            .ok_or_else(no_active_workspace)
    }

    pub async fn commit_step(&mut self) -> Result<CommitReport> {
        self.onboarding_mut()?.commit().await
    }

    /// Run the wizard's terminal action and switch the view to the board
    pub async fn start_onboarding(&mut self) -> Result<StartReport> {
        let active = self.active.as_mut().ok_or_else(no_active_workspace)?;
        let report = active.onboarding.start().await?;
        active.workspace = report.workspace.clone();
        Ok(report)
    }
}

impl Drop for WorkspaceSession {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn no_active_workspace() -> WorkspaceError {
    WorkspaceError::InvalidState("No workspace is active".to_string())
}
