use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use std::collections::BTreeMap;
use workspace_core::{
    error::{Result, WorkspaceError},
    models::{Workspace, WorkspaceId},
    roster::AgentKey,
    wizard::OnboardingRecord,
};

/// Convert a SQLite row from `workspaces` to a Workspace without selections
pub fn row_to_workspace(row: &SqliteRow) -> Result<Workspace> {
    let created_at: DateTime<Utc> = row.get("created_at");
    let completed: bool = row.get("onboarding_completed");

    let onboarding = row
        .try_get::<Option<String>, _>("onboarding_record")
        .ok()
        .flatten()
        .map(|raw| {
            serde_json::from_str::<OnboardingRecord>(&raw).map_err(|e| {
                WorkspaceError::Database(format!("Invalid onboarding record in database: {e}"))
            })
        })
        .transpose()?;

    Ok(Workspace {
        id: WorkspaceId::from(row.get::<String, _>("id")),
        name: row.get("name"),
        onboarding_completed: completed,
        onboarding,
        selections: BTreeMap::new(),
        created_at,
    })
}

/// Convert `workspace_selections` rows to a selection map.
///
/// Rows with an agent key this build no longer knows are skipped.
pub fn rows_to_selections(rows: &[SqliteRow]) -> BTreeMap<AgentKey, String> {
    rows.iter()
        .filter_map(|row| {
            let agent: String = row.get("agent");
            let tool: String = row.get("tool");
            match agent.parse::<AgentKey>() {
                Ok(agent) => Some((agent, tool)),
                Err(_) => {
                    tracing::warn!(agent = %agent, "Skipping selection for unknown agent");
                    None
                }
            }
        })
        .collect()
}

/// Convert SQLx error to WorkspaceError
pub fn sqlx_error_to_workspace_error(err: sqlx::Error) -> WorkspaceError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            let message = db_err.message();

            if code == "1555" || code == "2067" || message.contains("UNIQUE constraint failed") {
                WorkspaceError::Validation("Workspace id already exists".to_string())
            } else if code == "275" || message.contains("CHECK constraint failed") {
                WorkspaceError::empty_field("name")
            } else {
                WorkspaceError::Database(format!("Database constraint error: {message}"))
            }
        }
        sqlx::Error::RowNotFound => WorkspaceError::NotFound("Record not found".to_string()),
        sqlx::Error::PoolTimedOut => {
            WorkspaceError::Database("Connection pool timed out".to_string())
        }
        _ => WorkspaceError::Database(err.to_string()),
    }
}
