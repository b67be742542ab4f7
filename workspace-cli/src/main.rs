use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use workspace_cli::commands::{self, OnboardingAnswers};
use workspace_cli::config::Config;
use workspace_cli::setup::initialize_app;
use workspace_cli::telemetry::{init_telemetry, log_startup_info, report_error};
use workspace_core::{AgentKey, ContainerSize, SidebarState, WorkspaceId};

#[derive(Parser)]
#[command(name = "ai-workspace")]
#[command(about = "Headless driver for the AI Workspace assignment and layout engine")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    config: Option<String>,

    /// Database URL override
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Log level override
    #[arg(long, env = "LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a workspace
    Create { name: String },
    /// List workspaces, oldest first
    List,
    /// Rename a workspace
    Rename { id: String, name: String },
    /// Delete a workspace and its local selections
    Delete { id: String },
    /// Assign a tool to an agent
    Assign {
        id: String,
        agent: AgentKey,
        tool: String,
    },
    /// Print the board scene for a viewport
    Layout {
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
        /// Width taken by the open sidebar; 0 for a closed sidebar
        #[arg(long, default_value_t = 256.0)]
        sidebar_width: f64,
        /// Include this workspace's current assignments
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Open a workspace and print assignment changes until Ctrl-C
    Watch {
        id: String,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
    },
    /// Run the intake wizard from an answers file and start the workspace
    Onboard {
        id: String,
        #[arg(long)]
        answers: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_file) => Config::from_file(config_file)?,
        None => Config::from_env()?,
    };

    if let Some(ref database_url) = cli.database_url {
        config.database.url = Some(database_url.clone());
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;

    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration validation failed");
        std::process::exit(1);
    }

    log_startup_info(&config);

    if let Err(e) = run(cli.command, &config).await {
        report_error(&e, "command");
        return Err(e);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let app = initialize_app(config)
        .await
        .context("Failed to initialize application")?;
    let collaborators = app.collaborators;
    let mut out = std::io::stdout();

    match command {
        Command::Create { name } => commands::create(&collaborators, &name, &mut out).await,
        Command::List => commands::list(&collaborators, &mut out).await,
        Command::Rename { id, name } => {
            commands::rename(&collaborators, &WorkspaceId::from(id), &name, &mut out).await
        }
        Command::Delete { id } => commands::delete(&collaborators, &WorkspaceId::from(id), &mut out).await,
        Command::Assign { id, agent, tool } => {
            commands::assign(&collaborators, &WorkspaceId::from(id), agent, &tool, &mut out).await
        }
        Command::Layout {
            width,
            height,
            sidebar_width,
            workspace,
        } => {
            let sidebar = SidebarState::new(sidebar_width > 0.0, sidebar_width);
            let workspace = workspace.map(WorkspaceId::from);
            commands::layout(
                &collaborators,
                ContainerSize::new(width, height),
                sidebar,
                workspace.as_ref(),
                &mut out,
            )
            .await
        }
        Command::Watch { id, width, height } => {
            info!(workspace_id = %id, "Watching workspace");
            commands::watch(
                collaborators,
                config.session_config(),
                &WorkspaceId::from(id),
                ContainerSize::new(width, height),
                &mut out,
            )
            .await
        }
        Command::Onboard { id, answers } => {
            let answers = OnboardingAnswers::from_file(&answers)?;
            commands::onboard(
                &collaborators,
                config.notification_targets(),
                &WorkspaceId::from(id),
                &answers,
                &mut out,
            )
            .await
        }
    }
}
