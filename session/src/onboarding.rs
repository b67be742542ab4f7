//! Intake wizard with notification dispatch.
//!
//! The step engine decides what may happen; this module adds the outbound
//! side effects. Notification failures never roll a transition back: they
//! come back as an alert next to the successful result.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use workspace_core::error::{Result, WorkspaceError};
use workspace_core::wizard::{OnboardingRecord, StepCommit, StepEngine};
use workspace_core::{WebhookSink, Workspace, WorkspaceId, WorkspaceRepository};

/// Where onboarding notifications go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationTargets {
    /// Sent as the organization header on every notification
    pub organization_id: String,
    /// One URL per wizard step, in step order; a missing or empty entry
    /// skips that step's notification
    #[serde(default)]
    pub step_urls: Vec<String>,
    /// Called in order with the aggregate record after `start`
    #[serde(default)]
    pub aggregate_urls: Vec<String>,
}

impl NotificationTargets {
    fn step_url(&self, step: usize) -> Option<&str> {
        self.step_urls
            .get(step.checked_sub(1)?)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }
}

/// Outcome of a successful step commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub commit: StepCommit,
    /// Set when the step notification could not be delivered
    pub alert: Option<WorkspaceError>,
}

/// Outcome of the aggregate delivery sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    /// Targets that accepted the record, in call order
    pub delivered: Vec<String>,
    /// First target that failed; later targets were not called
    pub failed_target: Option<String>,
    pub error: Option<WorkspaceError>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed_target.is_none()
    }
}

/// Outcome of `start`
#[derive(Debug, Clone, PartialEq)]
pub struct StartReport {
    /// Workspace as persisted, `onboarding_completed` set
    pub workspace: Workspace,
    pub delivery: DeliveryReport,
}

/// Wizard for one workspace plus its outbound side effects
pub struct OnboardingFlow {
    workspace_id: WorkspaceId,
    engine: StepEngine,
    sink: Arc<dyn WebhookSink>,
    repo: Arc<dyn WorkspaceRepository>,
    targets: NotificationTargets,
}

impl OnboardingFlow {
    pub fn new(
        workspace_id: WorkspaceId,
        sink: Arc<dyn WebhookSink>,
        repo: Arc<dyn WorkspaceRepository>,
        targets: NotificationTargets,
    ) -> Self {
        Self::with_engine(workspace_id, StepEngine::intake(), sink, repo, targets)
    }

    pub fn with_engine(
        workspace_id: WorkspaceId,
        engine: StepEngine,
        sink: Arc<dyn WebhookSink>,
        repo: Arc<dyn WorkspaceRepository>,
        targets: NotificationTargets,
    ) -> Self {
        Self {
            workspace_id,
            engine,
            sink,
            repo,
            targets,
        }
    }

    pub fn engine(&self) -> &StepEngine {
        &self.engine
    }

    pub fn into_engine(self) -> StepEngine {
        self.engine
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.engine.set_field(key, value)
    }

    pub fn go_to(&mut self, step: usize) -> Result<()> {
        self.engine.go_to(step)
    }

    pub fn back(&mut self) -> Result<()> {
        self.engine.back()
    }

    pub fn reopen(&mut self, step: usize) -> Result<()> {
        self.engine.reopen(step)
    }

    /// Commit the current step and fire its notification.
    ///
    /// A validation failure returns `Err` with no transition and no
    /// notification. A delivery failure is reported in `alert`; the step
    /// stays committed.
    pub async fn commit(&mut self) -> Result<CommitReport> {
        let commit = self.engine.commit()?;

        let alert = match self.targets.step_url(commit.step) {
            Some(url) => self.notify(url, &commit.notification).await.err(),
            None => None,
        };

        Ok(CommitReport { commit, alert })
    }

    /// Aggregate all committed steps and hand the record to the workspace.
    ///
    /// The completion flag is persisted before any outbound delivery, so a
    /// failed delivery never blocks the switch to the board.
    pub async fn start(&mut self) -> Result<StartReport> {
        let mut engine = self.engine.clone();
        let record = engine.start()?;

        let workspace = self
            .repo
            .complete_onboarding(&self.workspace_id, &record)
            .await?;
        self.engine = engine;
        info!(workspace_id = %self.workspace_id, "Onboarding record persisted");

        let delivery = self.deliver_aggregate(&record).await;
        Ok(StartReport {
            workspace,
            delivery,
        })
    }

    /// Sequential delivery, aborting on the first failure. Earlier
    /// deliveries are not rolled back.
    async fn deliver_aggregate(&self, record: &OnboardingRecord) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let body = match serde_json::to_value(record) {
            Ok(body) => body,
            Err(e) => {
                report.error = Some(WorkspaceError::Internal(format!(
                    "Cannot encode onboarding record: {e}"
                )));
                report.failed_target = self.targets.aggregate_urls.first().cloned();
                return report;
            }
        };

        for url in &self.targets.aggregate_urls {
            match self.notify(url, &body).await {
                Ok(()) => report.delivered.push(url.clone()),
                Err(e) => {
                    report.failed_target = Some(url.clone());
                    report.error = Some(e);
                    break;
                }
            }
        }
        report
    }

    async fn notify(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let result = self
            .sink
            .post_json(url, &self.targets.organization_id, body)
            .await;
        if let Err(e) = &result {
            warn!(workspace_id = %self.workspace_id, url, error = %e, "Notification failed");
        }
        result
    }
}
