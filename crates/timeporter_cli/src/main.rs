//! Timeporter CLI - command-line interface for the migration engine.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timeporter")]
#[command(version)]
#[command(about = "Move time-tracking data from Toggl to Clockify")]
#[command(
    long_about = "Timeporter copies workspaces, clients, projects, tags, tasks, users, user \
groups and time entries from Toggl to Clockify. Records that already exist on \
both sides are matched up and left alone; everything else is created in \
dependency order, within each service's rate limits."
)]
#[command(after_long_help = r#"EXAMPLES
    See what a sync would do, without creating anything:
        $ timeporter status --workspace "Main"

    Sync one workspace:
        $ timeporter sync --workspace "Main"

    Sync every workspace that already exists on both sides:
        $ timeporter sync

    List workspaces on both sides with their link state:
        $ timeporter workspaces

CONFIGURATION
    Timeporter reads configuration from:
      1. ~/.config/timeporter/config.toml (or $XDG_CONFIG_HOME/timeporter/config.toml)
      2. Environment variables (TIMEPORTER_* prefix)
      3. .env file in the current directory

ENVIRONMENT VARIABLES
    TIMEPORTER_TOGGL_API_TOKEN      Toggl personal API token
    TIMEPORTER_TOGGL_EMAIL          Toggl account email (reports user_agent)
    TIMEPORTER_CLOCKIFY_API_KEY     Clockify API key
    TIMEPORTER_CLOCKIFY_USER_ID     Clockify user id (for time entry listing)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, match and create records in Clockify
    Sync {
        /// Source workspace name(s) to sync; repeatable. A named workspace
        /// missing on the Clockify side is created there first. Without
        /// this flag only workspaces existing on both sides are synced.
        #[arg(short, long = "workspace")]
        workspaces: Vec<String>,
    },
    /// Fetch and match, then report what a sync would create
    Status {
        /// Source workspace name(s) to inspect; repeatable.
        #[arg(short, long = "workspace")]
        workspaces: Vec<String>,
    },
    /// List workspaces on both services with their link state
    Workspaces,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Sync { workspaces } => commands::sync::run(&config, workspaces, false).await,
        Commands::Status { workspaces } => commands::sync::run(&config, workspaces, true).await,
        Commands::Workspaces => commands::workspaces::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
