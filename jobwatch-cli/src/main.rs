//! Jobwatch CLI
//!
//! Terminal dashboard for jobs executed by backend agents. The job list and
//! job detail views are kept up to date by the pollers in `jobwatch-poller`.

mod commands;
mod config;
mod id_resolver;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobwatch")]
#[command(about = "Watch agent jobs from the terminal", long_about = None)]
struct Cli {
    /// Jobs API URL
    #[arg(long, env = "JOBWATCH_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Bearer token issued by the session provider
    #[arg(long, env = "JOBWATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// File holding persisted pause flags
    #[arg(long, env = "JOBWATCH_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the dashboard
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobwatch=info,jobwatch_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        state_file: cli.state_file,
        request_timeout: std::time::Duration::from_secs(cli.request_timeout_secs),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
