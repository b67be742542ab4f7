use anyhow::{Context, Result};
use database::SqliteWorkspaceRepository;
use remote::{HttpWebhookSink, RestAssignmentStore, RestClient, RestMessageStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use workspace_session::Collaborators;

use crate::config::Config;

/// Everything a command needs, wired from configuration
pub struct App {
    pub repository: Arc<SqliteWorkspaceRepository>,
    pub collaborators: Collaborators,
}

/// Open the local workspace database and run its migrations
pub async fn create_repository(config: &Config) -> Result<Arc<SqliteWorkspaceRepository>> {
    let database_url = config.database_url();
    if !database_url.starts_with("sqlite://") && !database_url.contains(":memory:") {
        anyhow::bail!("Only SQLite databases are supported. Got: {database_url}");
    }
    info!(database_url = %database_url, "Opening workspace database");

    let repo = SqliteWorkspaceRepository::with_max_connections(
        &database_url,
        config.database.max_connections,
    )
    .await
    .context("Failed to create SQLite repository")?;

    repo.migrate()
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(repo))
}

/// Build the remote collaborators around an existing repository
pub fn create_collaborators(config: &Config, repository: Arc<SqliteWorkspaceRepository>) -> Collaborators {
    let client = RestClient::new(&config.store);
    info!(store_url = client.base_url(), "Remote store configured");

    Collaborators {
        assignments: Arc::new(RestAssignmentStore::new(
            client.clone(),
            config.store.assignments_table.clone(),
        )),
        messages: Arc::new(RestMessageStore::new(
            client,
            config.store.messages_table.clone(),
        )),
        workspaces: repository,
        webhooks: Arc::new(HttpWebhookSink::new(Duration::from_millis(
            config.webhooks.timeout_ms,
        ))),
    }
}

/// Initialize the complete application
pub async fn initialize_app(config: &Config) -> Result<App> {
    ensure_database_directory(&config.database_url())?;

    let repository = create_repository(config)
        .await
        .context("Failed to create repository")?;
    let collaborators = create_collaborators(config, repository.clone());

    Ok(App {
        repository,
        collaborators,
    })
}

/// Ensure the database directory exists with owner-only permissions
pub fn ensure_database_directory(database_url: &str) -> Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let db_path = Path::new(db_path);

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))
                    .context("Failed to set directory permissions")?;
            }
        }
    }
    Ok(())
}
