//! Dashboard view

use std::sync::Arc;

use anyhow::Result;
use colored::*;
use jobwatch_client::JobQuery;
use jobwatch_poller::{BulkTarget, Poller, PollerOptions};
use tracing::info;

use super::{DASHBOARD_KEY, PollingArgs, fetch_failure, run_live_view};
use crate::config::Config;
use crate::render::print_dashboard;

/// Watch the job list until the user quits
pub async fn watch_dashboard(config: &Config, limit: Option<u32>, polling: &PollingArgs) -> Result<()> {
    let client = Arc::new(config.client()?);
    let options = polling.options(PollerOptions::bulk(), DASHBOARD_KEY.to_string())?;

    let mut target = BulkTarget::new(client);
    if let Some(limit) = limit {
        target = target.with_limit(limit);
    }

    info!(
        "Watching jobs at {} every {:?}",
        config.api_url, options.base_interval
    );

    let poller = Poller::builder(target)
        .options(options)
        .pause_store(config.pause_store())
        .spawn();

    run_live_view(poller, |jobs| {
        print_dashboard(jobs);
        false
    })
    .await
}

/// Print the job list once without starting a poller
pub async fn print_status(config: &Config, limit: Option<u32>) -> Result<()> {
    let client = config.client()?;
    let jobs = client
        .fetch_job_summaries(limit)
        .await
        .map_err(|e| fetch_failure(e, "Failed to fetch jobs"))?;

    print_dashboard(&jobs);
    if config.pause_store().load(DASHBOARD_KEY) {
        println!("\n{}", "Dashboard polling is paused (jobwatch resume)".yellow());
    }
    Ok(())
}
