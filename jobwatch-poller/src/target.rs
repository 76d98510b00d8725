//! Poll targets
//!
//! A target tells the poll loop what to fetch and how soon to fetch it
//! again. The dashboard polls every job through [`BulkTarget`]; a detail
//! view polls one job through [`JobTarget`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobwatch_client::{ClientError, JobQuery};
use jobwatch_core::domain::job::{Job, JobSummary};
use thiserror::Error;
use uuid::Uuid;

use crate::interval::{bulk_interval, single_job_interval};

/// Why a fetch failed
///
/// Only ever surfaced through `PollingState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network, timeout, HTTP or parse failure
    #[error("{0}")]
    Transport(String),

    /// The polled job does not exist
    #[error("{0}")]
    NotFound(String),
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        if err.is_not_found() {
            FetchError::NotFound(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Something a poller keeps fresh
#[async_trait]
pub trait PollTarget: Send + Sync + 'static {
    /// Immutable result of one successful fetch
    type Snapshot: Clone + Send + Sync + 'static;

    /// Short label used in log lines
    fn label(&self) -> String;

    async fn fetch(&self) -> Result<Self::Snapshot, FetchError>;

    /// Delay before the next scheduled fetch, `None` to stop scheduling
    fn next_interval(&self, snapshot: &Self::Snapshot, base: Duration) -> Option<Duration>;
}

/// Every job on the dashboard, as summaries
pub struct BulkTarget<Q: ?Sized> {
    query: Arc<Q>,
    limit: Option<u32>,
}

impl<Q: JobQuery + ?Sized> BulkTarget<Q> {
    pub fn new(query: Arc<Q>) -> Self {
        Self { query, limit: None }
    }

    /// Caps the number of summaries requested per poll
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl<Q: JobQuery + ?Sized + 'static> PollTarget for BulkTarget<Q> {
    type Snapshot = Vec<JobSummary>;

    fn label(&self) -> String {
        "all jobs".to_string()
    }

    async fn fetch(&self) -> Result<Vec<JobSummary>, FetchError> {
        Ok(self.query.fetch_job_summaries(self.limit).await?)
    }

    fn next_interval(&self, snapshot: &Vec<JobSummary>, base: Duration) -> Option<Duration> {
        Some(bulk_interval(snapshot, base))
    }
}

/// One job, as its full record
pub struct JobTarget<Q: ?Sized> {
    query: Arc<Q>,
    job_id: Uuid,
}

impl<Q: JobQuery + ?Sized> JobTarget<Q> {
    pub fn new(query: Arc<Q>, job_id: Uuid) -> Self {
        Self { query, job_id }
    }
}

#[async_trait]
impl<Q: JobQuery + ?Sized + 'static> PollTarget for JobTarget<Q> {
    type Snapshot = Job;

    fn label(&self) -> String {
        format!("job {}", self.job_id)
    }

    async fn fetch(&self) -> Result<Job, FetchError> {
        Ok(self.query.fetch_job_by_id(self.job_id).await?)
    }

    fn next_interval(&self, snapshot: &Job, base: Duration) -> Option<Duration> {
        single_job_interval(snapshot, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_fetch_errors() {
        let not_found: FetchError = ClientError::NotFound("job 1".to_string()).into();
        assert!(matches!(not_found, FetchError::NotFound(_)));

        let http_404: FetchError = ClientError::api_error(404, "missing").into();
        assert!(matches!(http_404, FetchError::NotFound(_)));

        let server: FetchError = ClientError::api_error(500, "boom").into();
        assert_eq!(
            server,
            FetchError::Transport("API error (status 500): boom".to_string())
        );

        let parse: FetchError = ClientError::ParseError("eof".to_string()).into();
        assert!(matches!(parse, FetchError::Transport(_)));
    }
}
