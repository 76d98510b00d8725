//! ID resolver module
//!
//! Resolves job ID prefixes to full UUIDs so users can type the first few
//! characters shown on the dashboard instead of the whole ID.

use anyhow::{Context, Result, anyhow};
use jobwatch_client::JobQuery;
use uuid::Uuid;

/// Identifier that can be either a full UUID or an unambiguous prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    /// Full UUID
    Full(Uuid),
    /// Lowercased prefix that should uniquely identify a job
    Prefix(String),
}

impl IdOrPrefix {
    /// Parses a full UUID, falling back to a prefix
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }
}

/// Resolve a job ID or prefix to a full UUID
///
/// Full UUIDs are returned as-is. Prefixes are matched against the job
/// summaries currently visible on the dashboard.
///
/// # Errors
/// Returns an error if:
/// - The prefix is empty
/// - No job matches the prefix
/// - Multiple jobs match the prefix (ambiguous)
/// - API call fails
pub async fn resolve_job_id<Q: JobQuery + ?Sized>(query: &Q, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) if prefix.is_empty() => {
            return Err(anyhow!("Job ID cannot be empty"));
        }
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let jobs = query
        .fetch_job_summaries(None)
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    let matches: Vec<Uuid> = jobs
        .iter()
        .map(|job| job.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
