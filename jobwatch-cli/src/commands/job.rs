//! Job detail view

use std::sync::Arc;

use anyhow::Result;
use colored::*;
use jobwatch_poller::{JobTarget, Poller, PollerOptions};
use tracing::info;

use super::{PollingArgs, job_key, run_live_view};
use crate::config::Config;
use crate::id_resolver;
use crate::render::print_job_details;

/// Watch one job until it reaches a terminal status
///
/// With `follow`, the view stays open after that; a forced refresh can then
/// pick up a job that gets restarted.
pub async fn watch_job(config: &Config, id: &str, follow: bool, polling: &PollingArgs) -> Result<()> {
    let client = Arc::new(config.client()?);
    let job_id = id_resolver::resolve_job_id(client.as_ref(), id).await?;
    let options = polling.options(PollerOptions::single_job(), job_key(job_id))?;

    info!("Watching job {} every {:?}", job_id, options.base_interval);

    let poller = Poller::builder(JobTarget::new(client, job_id))
        .options(options)
        .pause_store(config.pause_store())
        .spawn();

    run_live_view(poller, |job| {
        print_job_details(job);
        if job.status.is_terminal() && !follow {
            println!(
                "\n{}",
                format!("Job {}, no further updates.", job.status).dimmed()
            );
            return true;
        }
        false
    })
    .await
}
