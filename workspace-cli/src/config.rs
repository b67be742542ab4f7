use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use remote::RestConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use workspace_session::{NotificationTargets, SessionConfig};

const ENV_PREFIX: &str = "AIWS";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub store: RestConfig,
    pub webhooks: WebhookConfig,
    pub session: SessionSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Optional database URL. Defaults to a file under the user's data dir
    pub url: Option<String>,
    /// Maximum number of database connections in the pool
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WebhookConfig {
    /// Sent as `X-Organization-Id` with every notification
    pub organization_id: String,
    /// One URL per wizard step, in step order
    #[serde(default)]
    pub step_urls: Vec<String>,
    /// Receivers of the aggregate record, called in order
    #[serde(default)]
    pub aggregate_urls: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionSettings {
    pub assignment_poll_ms: u64,
    pub message_poll_ms: u64,
    pub layout_quiet_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl Config {
    /// Load configuration from the embedded defaults, `CONFIG_FILE` and
    /// `AIWS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut builder = ConfigBuilder::builder().add_source(defaults());

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(
                File::with_name(&config_file)
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        let config = builder
            .add_source(environment())
            .build()
            .context("Failed to build configuration")?;

        let mut result: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Self::apply_standard_env_vars(&mut result);

        Ok(result)
    }

    /// Load configuration from a specific file path on top of the defaults
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = ConfigBuilder::builder()
            .add_source(defaults())
            .add_source(File::with_name(path).format(FileFormat::Toml))
            .add_source(environment());

        let config = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {path}"))?;

        let mut result: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration from file")?;

        Self::apply_standard_env_vars(&mut result);

        Ok(result)
    }

    /// DATABASE_URL and LOG_LEVEL win over every other source
    fn apply_standard_env_vars(config: &mut Config) {
        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database.url = Some(database_url);
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }

    pub fn merge_with_env(mut self) -> Self {
        Self::apply_standard_env_vars(&mut self);
        self
    }

    /// Get the database URL with default fallback under the data directory
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => Self::default_database_url(),
        }
    }

    pub fn default_database_url() -> String {
        if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
            return format!("sqlite://{xdg_data}/ai-workspace/ai-workspace.sqlite");
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        format!("sqlite://{home}/.ai-workspace/ai-workspace.sqlite")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            assignment_poll_interval: Duration::from_millis(self.session.assignment_poll_ms),
            message_poll_interval: Duration::from_millis(self.session.message_poll_ms),
            layout_quiet_period: Duration::from_millis(self.session.layout_quiet_ms),
            notifications: self.notification_targets(),
        }
    }

    pub fn notification_targets(&self) -> NotificationTargets {
        NotificationTargets {
            organization_id: self.webhooks.organization_id.clone(),
            step_urls: self.webhooks.step_urls.clone(),
            aggregate_urls: self.webhooks.aggregate_urls.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ));
            }
        }

        let database_url = self.database_url();
        if !database_url.starts_with("sqlite://") && !database_url.contains(":memory:") {
            return Err(anyhow::anyhow!(
                "Only SQLite databases are supported. URL must start with 'sqlite://'. Got: {}",
                database_url
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!(
                "Database max_connections must be greater than 0"
            ));
        }

        if !is_http_url(&self.store.base_url) {
            return Err(anyhow::anyhow!(
                "Store base_url must be an http(s) URL. Got: {}",
                self.store.base_url
            ));
        }

        for url in self
            .webhooks
            .step_urls
            .iter()
            .filter(|u| !u.trim().is_empty())
            .chain(&self.webhooks.aggregate_urls)
        {
            if !is_http_url(url) {
                return Err(anyhow::anyhow!("Webhook URL must be http(s). Got: {}", url));
            }
        }

        let intervals = [
            ("session.assignment_poll_ms", self.session.assignment_poll_ms),
            ("session.message_poll_ms", self.session.message_poll_ms),
            ("session.layout_quiet_ms", self.session.layout_quiet_ms),
            ("store.timeout_ms", self.store.timeout_ms),
            ("webhooks.timeout_ms", self.webhooks.timeout_ms),
        ];
        if let Some((key, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(anyhow::anyhow!("{key} must be greater than 0"));
        }

        Ok(())
    }
}

fn defaults() -> File<config::FileSourceString, FileFormat> {
    File::from_str(include_str!("../config/default.toml"), FileFormat::Toml)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            store: RestConfig::default(),
            webhooks: WebhookConfig {
                organization_id: String::new(),
                step_urls: Vec::new(),
                aggregate_urls: Vec::new(),
                timeout_ms: 10_000,
            },
            session: SessionSettings {
                assignment_poll_ms: session.assignment_poll_interval.as_millis() as u64,
                message_poll_ms: session.message_poll_interval.as_millis() as u64,
                layout_quiet_ms: session.layout_quiet_period.as_millis() as u64,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
