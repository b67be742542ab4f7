//! Subcommand implementations. Each writes its human-readable result to
//! `out`; diagnostics go through `tracing`.

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use workspace_core::{
    render_board, AgentKey, AssignmentBoard, AssignmentRow, ContainerSize, NewWorkspace,
    SidebarState, StepSpec, Workspace, WorkspaceId,
};
use workspace_session::{
    AssignmentWriter, Collaborators, NotificationTargets, OnboardingFlow, SessionConfig,
    WorkspaceSession,
};

/// Wizard answers file: one table per step, in step order
#[derive(Debug, Deserialize)]
pub struct OnboardingAnswers {
    pub steps: Vec<BTreeMap<String, toml::Value>>,
}

impl OnboardingAnswers {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid answers file {}", path.display()))
    }

    fn step(&self, index: usize) -> impl Iterator<Item = (&str, String)> {
        self.steps
            .get(index)
            .into_iter()
            .flatten()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.as_str(), value)
            })
    }

    /// Answers of one step in the step's field order, so a choice is set
    /// before the fields that depend on it. Keys the step does not define
    /// come last.
    fn ordered_step(&self, index: usize, spec: &StepSpec) -> Vec<(&str, String)> {
        let mut answers: Vec<_> = self.step(index).collect();
        answers.sort_by_key(|(key, _)| {
            spec.fields
                .iter()
                .position(|f| f.key == *key)
                .unwrap_or(usize::MAX)
        });
        answers
    }
}

fn describe(workspace: &Workspace) -> String {
    let status = if workspace.onboarding_completed {
        "board"
    } else {
        "onboarding"
    };
    let selections = workspace
        .selections
        .iter()
        .map(|(agent, tool)| format!("{agent}={tool}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}\t{}\t{}\t{}", workspace.id, workspace.name, status, selections)
}

async fn require(collaborators: &Collaborators, id: &WorkspaceId) -> Result<Workspace> {
    collaborators
        .workspaces
        .get(id)
        .await?
        .with_context(|| format!("Workspace {id} does not exist"))
}

pub async fn create(collaborators: &Collaborators, name: &str, out: &mut impl Write) -> Result<()> {
    let workspace = collaborators
        .workspaces
        .create(NewWorkspace::new(name))
        .await
        .context("Failed to create workspace")?;
    info!(workspace_id = %workspace.id, "Workspace created");
    writeln!(out, "{}", describe(&workspace))?;
    Ok(())
}

pub async fn list(collaborators: &Collaborators, out: &mut impl Write) -> Result<()> {
    for workspace in collaborators.workspaces.list().await? {
        writeln!(out, "{}", describe(&workspace))?;
    }
    Ok(())
}

pub async fn rename(
    collaborators: &Collaborators,
    id: &WorkspaceId,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    let workspace = collaborators
        .workspaces
        .rename(id, name)
        .await
        .with_context(|| format!("Failed to rename workspace {id}"))?;
    writeln!(out, "{}", describe(&workspace))?;
    Ok(())
}

pub async fn delete(collaborators: &Collaborators, id: &WorkspaceId, out: &mut impl Write) -> Result<()> {
    collaborators
        .workspaces
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete workspace {id}"))?;
    writeln!(out, "deleted {id}")?;
    Ok(())
}

/// Manual assignment through the same write path the board uses
pub async fn assign(
    collaborators: &Collaborators,
    id: &WorkspaceId,
    agent: AgentKey,
    tool_name: &str,
    out: &mut impl Write,
) -> Result<()> {
    require(collaborators, id).await?;

    let snapshot = collaborators
        .assignments
        .fetch(id)
        .await
        .context("Failed to load current assignments")?
        .unwrap_or_else(|| AssignmentRow::empty(id));

    let board = Arc::new(Mutex::new(AssignmentBoard::new(
        id.clone(),
        ContainerSize::new(1000.0, 600.0),
    )));
    board.lock().apply_snapshot(&snapshot);

    let writer = AssignmentWriter::new(board.clone(), collaborators.assignments.clone())
        .with_mirror(collaborators.workspaces.clone());

    if writer.assign(agent, tool_name).await {
        let tool = board.lock().get(agent).map(|a| a.tool.name()).unwrap_or_default();
        writeln!(out, "{agent} -> {tool}")?;
    } else {
        let allowed = agent
            .allowed_tools()
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "ignored: {tool_name} is not available to {agent} (allowed: {allowed})")?;
    }
    Ok(())
}

/// Print the board scene for a viewport, optionally with a workspace's
/// current assignments
pub async fn layout(
    collaborators: &Collaborators,
    viewport: ContainerSize,
    sidebar: SidebarState,
    workspace: Option<&WorkspaceId>,
    out: &mut impl Write,
) -> Result<()> {
    let id = workspace.cloned().unwrap_or_else(|| WorkspaceId::from("preview"));
    let size = ContainerSize::new(sidebar.board_width(viewport.width), viewport.height);
    let mut board = AssignmentBoard::new(id.clone(), size);

    if workspace.is_some() {
        if let Some(row) = collaborators.assignments.fetch(&id).await? {
            board.apply_snapshot(&row);
        }
    }

    let rendered = render_board(&board);
    writeln!(out, "{}", serde_json::to_string_pretty(&rendered)?)?;
    Ok(())
}

/// Activate a session and print the board whenever it changes
pub async fn watch(
    collaborators: Collaborators,
    config: SessionConfig,
    id: &WorkspaceId,
    viewport: ContainerSize,
    out: &mut impl Write,
) -> Result<()> {
    let refresh = config.assignment_poll_interval;
    let mut session = WorkspaceSession::new(config, collaborators);
    session
        .activate(id, viewport)
        .await
        .with_context(|| format!("Failed to activate workspace {id}"))?;

    let mut last = String::new();
    let mut ticker = tokio::time::interval(refresh);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, closing workspace");
                break;
            }
            _ = ticker.tick() => {
                let Some(board) = session.board() else { break };
                let line = board
                    .assignments()
                    .values()
                    .map(|a| format!("{}={}", a.agent, a.tool.name()))
                    .collect::<Vec<_>>()
                    .join(" ");
                if line != last {
                    writeln!(out, "{id}: {}", if line.is_empty() { "(no assignments)" } else { line.as_str() })?;
                    out.flush()?;
                    last = line;
                }
            }
        }
    }

    session.deactivate();
    Ok(())
}

/// Drive the intake wizard with answers from a file, then start
pub async fn onboard(
    collaborators: &Collaborators,
    targets: NotificationTargets,
    id: &WorkspaceId,
    answers: &OnboardingAnswers,
    out: &mut impl Write,
) -> Result<()> {
    let workspace = require(collaborators, id).await?;
    if workspace.onboarding_completed {
        bail!("Workspace {id} has already completed onboarding");
    }

    let mut flow = OnboardingFlow::new(
        id.clone(),
        collaborators.webhooks.clone(),
        collaborators.workspaces.clone(),
        targets,
    );

    let steps = flow.engine().step_count();
    for index in 0..steps {
        let spec = flow
            .engine()
            .spec(index + 1)
            .cloned()
            .with_context(|| format!("Step {} is not defined", index + 1))?;
        for (key, value) in answers.ordered_step(index, &spec) {
            flow.set_field(key, value)
                .with_context(|| format!("Step {}: field {key}", index + 1))?;
        }
        let report = flow
            .commit()
            .await
            .with_context(|| format!("Step {} is incomplete", index + 1))?;
        match report.alert {
            Some(alert) => writeln!(out, "step {} committed; notification failed: {alert}", report.commit.step)?,
            None => writeln!(out, "step {} committed", report.commit.step)?,
        }
    }

    let report = flow.start().await.context("Failed to start workspace")?;
    writeln!(out, "onboarding complete for {}", report.workspace.id)?;
    for url in &report.delivery.delivered {
        writeln!(out, "delivered {url}")?;
    }
    if let (Some(target), Some(error)) = (&report.delivery.failed_target, &report.delivery.error) {
        writeln!(out, "delivery stopped at {target}: {error}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workspace_core::{FieldKind, FieldSpec, StepEngine};

    #[test]
    fn test_answers_accept_numbers_and_strings() {
        let answers: OnboardingAnswers = toml::from_str(
            r#"
            [[steps]]
            targetCustomers = 500

            [[steps]]
            companySize = "51-200"
            jobTitles = "VP Sales"
            "#,
        )
        .unwrap();

        let first: Vec<_> = answers.step(0).collect();
        assert_eq!(first, vec![("targetCustomers", "500".to_string())]);
        assert_eq!(answers.step(1).count(), 2);
        assert_eq!(answers.step(5).count(), 0);
    }

    #[test]
    fn test_choice_is_set_before_dependent_field() {
        let spec = StepSpec {
            title: "Plan".to_string(),
            fields: vec![
                FieldSpec {
                    key: "tier".to_string(),
                    wire_name: "tier".to_string(),
                    label: "Tier".to_string(),
                    kind: FieldKind::Choice(vec!["Gold".to_string(), "Silver".to_string()]),
                    required: true,
                    depends_on: None,
                },
                FieldSpec {
                    key: "addon".to_string(),
                    wire_name: "addon".to_string(),
                    label: "Add-on".to_string(),
                    kind: FieldKind::Text,
                    required: true,
                    depends_on: Some("tier".to_string()),
                },
            ],
        };
        let answers: OnboardingAnswers = toml::from_str(
            r#"
            [[steps]]
            addon = "Priority support"
            extra = "ignored"
            tier = "Gold"
            "#,
        )
        .unwrap();

        let ordered = answers.ordered_step(0, &spec);
        let keys: Vec<_> = ordered.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["tier", "addon", "extra"]);

        let mut engine = StepEngine::new(vec![spec]).unwrap();
        for (key, value) in ordered.into_iter().take(2) {
            engine.set_field(key, value).unwrap();
        }
        assert!(engine.can_commit());
    }
}
