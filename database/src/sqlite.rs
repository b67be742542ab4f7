use crate::common::{row_to_workspace, rows_to_selections, sqlx_error_to_workspace_error};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use workspace_core::{
    error::{Result, WorkspaceError},
    models::{NewWorkspace, Workspace, WorkspaceId},
    repository::WorkspaceRepository,
    roster::AgentKey,
    validation::FieldValidator,
    wizard::OnboardingRecord,
};

/// SQLite implementation of the WorkspaceRepository trait
///
/// Workspaces live in local durable storage until the user deletes them;
/// nothing is garbage-collected.
#[derive(Debug, Clone)]
pub struct SqliteWorkspaceRepository {
    pool: SqlitePool,
}

impl SqliteWorkspaceRepository {
    /// Create a new SQLite repository with the given database URL
    ///
    /// # Arguments
    /// * `database_url` - SQLite database URL (file path or `:memory:`)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use database::SqliteWorkspaceRepository;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// // In-memory database for testing
    /// let repo = SqliteWorkspaceRepository::new(":memory:").await?;
    ///
    /// // File-based database
    /// let repo = SqliteWorkspaceRepository::new("sqlite:///tmp/workspaces.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::with_max_connections(database_url, 5).await
    }

    /// Same as [`new`](Self::new) with an explicit pool size.
    ///
    /// In-memory databases always use a single connection; every extra
    /// connection would open its own empty database.
    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let db_url = if in_memory || database_url.starts_with("sqlite://") {
            database_url.to_string()
        } else {
            format!("sqlite://{database_url}")
        };

        if !in_memory && !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            match Sqlite::create_database(&db_url).await {
                Ok(_) => tracing::info!("Database created successfully"),
                Err(error) => {
                    tracing::error!("Error creating database: {}", error);
                    return Err(WorkspaceError::Database(format!(
                        "Failed to create database: {error}"
                    )));
                }
            }
        }

        let connect_options = if in_memory {
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(":memory:")
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Memory)
                .busy_timeout(std::time::Duration::from_secs(5))
                .foreign_keys(true)
        } else {
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(db_url.replace("sqlite://", ""))
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .busy_timeout(std::time::Duration::from_secs(5))
                .foreign_keys(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections.max(1) })
            .connect_with(connect_options)
            .await
            .map_err(sqlx_error_to_workspace_error)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| WorkspaceError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    /// Access to the underlying pool for tests
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
        let row = sqlx::query("SELECT * FROM workspaces WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_workspace_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut workspace = row_to_workspace(&row)?;

        let selection_rows =
            sqlx::query("SELECT agent, tool FROM workspace_selections WHERE workspace_id = ?")
                .bind(id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(sqlx_error_to_workspace_error)?;
        workspace.selections = rows_to_selections(&selection_rows);

        Ok(Some(workspace))
    }

    async fn require(&self, id: &WorkspaceId) -> Result<Workspace> {
        self.load(id)
            .await?
            .ok_or_else(|| WorkspaceError::workspace_not_found(id.as_str()))
    }
}

#[async_trait]
impl WorkspaceRepository for SqliteWorkspaceRepository {
    async fn create(&self, workspace: NewWorkspace) -> Result<Workspace> {
        FieldValidator::validate_workspace_name(&workspace.name)?;

        let row = sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, onboarding_completed, created_at)
            VALUES (?, ?, 0, ?)
            RETURNING id, name, onboarding_completed, onboarding_record, created_at
            "#,
        )
        .bind(workspace.id.as_str())
        .bind(workspace.name.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(sqlx_error_to_workspace_error)?;

        tracing::info!(workspace_id = %workspace.id, "Workspace created");
        row_to_workspace(&row)
    }

    async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
        self.load(id).await
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM workspaces ORDER BY created_at ASC, id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(sqlx_error_to_workspace_error)?;

        let mut workspaces = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(workspace) = self.load(&WorkspaceId::from(id)).await? {
                workspaces.push(workspace);
            }
        }
        Ok(workspaces)
    }

    async fn rename(&self, id: &WorkspaceId, name: &str) -> Result<Workspace> {
        FieldValidator::validate_workspace_name(name)?;

        let result = sqlx::query("UPDATE workspaces SET name = ? WHERE id = ?")
            .bind(name.trim())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(sqlx_error_to_workspace_error)?;

        if result.rows_affected() == 0 {
            return Err(WorkspaceError::workspace_not_found(id.as_str()));
        }
        self.require(id).await
    }

    async fn set_selection(
        &self,
        id: &WorkspaceId,
        agent: AgentKey,
        tool: Option<&str>,
    ) -> Result<()> {
        self.require(id).await?;

        match tool {
            Some(tool) => {
                sqlx::query(
                    r#"
                    INSERT INTO workspace_selections (workspace_id, agent, tool)
                    VALUES (?, ?, ?)
                    ON CONFLICT (workspace_id, agent) DO UPDATE SET tool = excluded.tool
                    "#,
                )
                .bind(id.as_str())
                .bind(agent.as_str())
                .bind(tool)
                .execute(&self.pool)
                .await
                .map_err(sqlx_error_to_workspace_error)?;
            }
            None => {
                sqlx::query("DELETE FROM workspace_selections WHERE workspace_id = ? AND agent = ?")
                    .bind(id.as_str())
                    .bind(agent.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(sqlx_error_to_workspace_error)?;
            }
        }

        Ok(())
    }

    async fn complete_onboarding(
        &self,
        id: &WorkspaceId,
        record: &OnboardingRecord,
    ) -> Result<Workspace> {
        let raw = serde_json::to_string(record)
            .map_err(|e| WorkspaceError::Internal(format!("Cannot encode onboarding record: {e}")))?;

        let result = sqlx::query(
            "UPDATE workspaces SET onboarding_completed = 1, onboarding_record = ? \
             WHERE id = ? AND onboarding_completed = 0",
        )
        .bind(raw)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(sqlx_error_to_workspace_error)?;

        let workspace = self.require(id).await?;
        if result.rows_affected() == 0 {
            tracing::debug!(workspace_id = %id, "Onboarding already completed");
        } else {
            tracing::info!(workspace_id = %id, "Onboarding completed");
        }
        Ok(workspace)
    }

    async fn delete(&self, id: &WorkspaceId) -> Result<()> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(sqlx_error_to_workspace_error)?;

        if result.rows_affected() == 0 {
            return Err(WorkspaceError::workspace_not_found(id.as_str()));
        }
        tracing::info!(workspace_id = %id, "Workspace deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(sqlx_error_to_workspace_error)?;
        Ok(())
    }
}
