//! Commands module
//!
//! Defines all CLI commands and their handlers, plus the interactive loop
//! shared by the live views.

mod job;
mod watch;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use jobwatch_client::ClientError;
use jobwatch_core::domain::polling::PollingState;
use jobwatch_poller::{PollTarget, Poller, PollerOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Config;
use crate::render::{print_controls, print_polling_state};

/// Pause key used by the dashboard view
pub const DASHBOARD_KEY: &str = "dashboard";

/// Pause key used by the detail view of `job_id`
pub fn job_key(job_id: uuid::Uuid) -> String {
    format!("job:{}", job_id)
}

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Watch every job, refreshing as they progress
    Watch {
        /// Maximum number of jobs to fetch per refresh
        #[arg(long)]
        limit: Option<u32>,

        #[command(flatten)]
        polling: PollingArgs,
    },
    /// Watch a single job until it finishes
    Job {
        /// Job ID or unambiguous prefix
        id: String,

        /// Keep the view open after the job reaches a terminal status
        #[arg(short, long)]
        follow: bool,

        #[command(flatten)]
        polling: PollingArgs,
    },
    /// Persistently pause a view, so it opens paused next time
    Pause {
        /// View key ("dashboard" or "job:<id>")
        #[arg(default_value = DASHBOARD_KEY)]
        key: String,
    },
    /// Clear a persisted pause
    Resume {
        /// View key ("dashboard" or "job:<id>")
        #[arg(default_value = DASHBOARD_KEY)]
        key: String,
    },
    /// Print the job list once, with the dashboard pause flag
    Status {
        /// Maximum number of jobs to fetch
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Polling overrides shared by the live views
#[derive(Args, Debug, Clone, Default)]
pub struct PollingArgs {
    /// Base polling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Fast retries after a failure before falling back to the base interval
    #[arg(long)]
    max_retries: Option<u32>,

    /// Do not remember pause/resume across runs
    #[arg(long)]
    no_persist: bool,
}

impl PollingArgs {
    /// Resolves poller options: variant defaults, then environment, then flags
    fn options(&self, defaults: PollerOptions, persist_key: String) -> Result<PollerOptions> {
        let mut options = PollerOptions::from_env(defaults);
        if let Some(ms) = self.interval_ms {
            options = options.with_base_interval(Duration::from_millis(ms));
        }
        if let Some(max_retries) = self.max_retries {
            options = options.with_max_retries(max_retries);
        }
        if !self.no_persist {
            options = options.with_persist_key(persist_key);
        }
        options.validate().context("Invalid polling options")?;
        Ok(options)
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Watch { limit, polling } => watch::watch_dashboard(config, limit, &polling).await,
        Commands::Job {
            id,
            follow,
            polling,
        } => job::watch_job(config, &id, follow, &polling).await,
        Commands::Pause { key } => set_paused(config, &key, true),
        Commands::Resume { key } => set_paused(config, &key, false),
        Commands::Status { limit } => watch::print_status(config, limit).await,
    }
}

fn set_paused(config: &Config, key: &str, paused: bool) -> Result<()> {
    config.pause_store().save(key, paused);
    println!("{} {}", key, if paused { "paused" } else { "resumed" });
    Ok(())
}

/// Wraps an API failure, adding a remedy when the user can fix it with a flag
fn fetch_failure(err: ClientError, what: &str) -> anyhow::Error {
    let message = if err.is_unauthorized() {
        format!("{} (token rejected, check --token or JOBWATCH_TOKEN)", what)
    } else if err.is_timeout() {
        format!("{} (timed out, raise --request-timeout-secs)", what)
    } else {
        what.to_string()
    };
    anyhow::Error::new(err).context(message)
}

/// Line-based controls read from stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Refresh,
    Quit,
}

impl Control {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" => Some(Control::Pause),
            "r" | "resume" => Some(Control::Resume),
            "f" | "refresh" => Some(Control::Refresh),
            "q" | "quit" | "exit" => Some(Control::Quit),
            _ => None,
        }
    }
}

/// Parts of the polling state worth a new status line
fn status_key(state: &PollingState) -> (bool, Option<String>, u32) {
    (state.is_paused, state.error.clone(), state.retry_count)
}

/// Runs a live view until quit, Ctrl-C, or `render` asks to stop
///
/// `render` is called with every new snapshot and returns true to end the
/// view.
async fn run_live_view<T: PollTarget>(
    poller: Poller<T>,
    mut render: impl FnMut(&T::Snapshot) -> bool,
) -> Result<()> {
    let mut snapshots = poller.subscribe_snapshot();
    let mut states = poller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    print_controls();
    let mut last_status = {
        let state = states.borrow_and_update();
        print_polling_state(&state);
        status_key(&state)
    };

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    if render(&snapshot) {
                        break;
                    }
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                let status = status_key(&state);
                if status != last_status {
                    print_polling_state(&state);
                    last_status = status;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read controls from stdin")? {
                    None => stdin_open = false,
                    Some(line) => match Control::parse(&line) {
                        Some(Control::Pause) => poller.pause().await,
                        Some(Control::Resume) => poller.resume().await,
                        Some(Control::Refresh) => poller.force_update().await,
                        Some(Control::Quit) => break,
                        None if line.trim().is_empty() => {}
                        None => print_controls(),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_parsing() {
        assert_eq!(Control::parse("p"), Some(Control::Pause));
        assert_eq!(Control::parse(" Resume \n"), Some(Control::Resume));
        assert_eq!(Control::parse("f"), Some(Control::Refresh));
        assert_eq!(Control::parse("exit"), Some(Control::Quit));
        assert_eq!(Control::parse("x"), None);
    }

    #[test]
    fn test_fetch_failure_hints() {
        let rejected = fetch_failure(ClientError::api_error(401, "expired"), "Failed to fetch jobs");
        assert!(rejected.to_string().contains("JOBWATCH_TOKEN"));

        let down = fetch_failure(ClientError::api_error(503, "down"), "Failed to fetch jobs");
        assert_eq!(down.to_string(), "Failed to fetch jobs");
        assert_eq!(down.root_cause().to_string(), "API error (status 503): down");
    }

    #[test]
    fn test_polling_args_override_defaults() {
        let args = PollingArgs {
            interval_ms: Some(2500),
            max_retries: Some(5),
            no_persist: false,
        };

        let options = args
            .options(PollerOptions::bulk(), DASHBOARD_KEY.to_string())
            .unwrap();
        assert_eq!(options.base_interval, Duration::from_millis(2500));
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.persist_key.as_deref(), Some("dashboard"));
    }

    #[test]
    fn test_polling_args_reject_zero_interval() {
        let args = PollingArgs {
            interval_ms: Some(0),
            ..PollingArgs::default()
        };
        assert!(args.options(PollerOptions::bulk(), job_key(uuid::Uuid::nil())).is_err());
    }

    #[test]
    fn test_no_persist_skips_key() {
        let args = PollingArgs {
            no_persist: true,
            ..PollingArgs::default()
        };
        let options = args
            .options(PollerOptions::single_job(), job_key(uuid::Uuid::nil()))
            .unwrap();
        assert!(options.persist_key.is_none());
    }
}
