//! Job-related API endpoints

use async_trait::async_trait;
use jobwatch_core::domain::job::{Job, JobSummary};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::DashboardClient;
use crate::error::{ClientError, Result};

/// Job queries the dashboard pollers depend on
///
/// Implemented by [`DashboardClient`] over HTTP; tests substitute scripted
/// fakes.
#[async_trait]
pub trait JobQuery: Send + Sync {
    /// Fetches the minimal projection of every job visible to the caller
    ///
    /// An empty job list is `Ok(vec![])`, never an error.
    ///
    /// # Arguments
    /// * `limit` - Optional upper bound on the number of summaries returned
    async fn fetch_job_summaries(&self, limit: Option<u32>) -> Result<Vec<JobSummary>>;

    /// Fetches the full record of one job
    ///
    /// Fails with [`ClientError::NotFound`] when the job does not exist.
    async fn fetch_job_by_id(&self, job_id: Uuid) -> Result<Job>;
}

#[derive(Debug, Serialize)]
struct ListJobsQuery {
    minimal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl DashboardClient {
    // =============================================================================
    // Job Queries
    // =============================================================================

    /// List job summaries
    ///
    /// # Arguments
    /// * `limit` - Optional maximum number of jobs to return
    ///
    /// # Returns
    /// The minimal projection of each job, most recently updated first
    pub async fn list_job_summaries(&self, limit: Option<u32>) -> Result<Vec<JobSummary>> {
        let response = self
            .get("/api/jobs")
            .query(&ListJobsQuery {
                minimal: true,
                limit,
            })
            .send()
            .await?;

        let jobs: Vec<JobSummary> = self.handle_response(response).await?;
        debug!("Fetched {} job summaries", jobs.len());
        Ok(jobs)
    }

    /// Get a job by ID
    ///
    /// # Arguments
    /// * `job_id` - The job UUID
    ///
    /// # Returns
    /// The full job record
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let response = self.get(&format!("/api/jobs/{}", job_id)).send().await?;

        match self.handle_response(response).await {
            Err(e) if e.is_not_found() => Err(ClientError::NotFound(format!("job {}", job_id))),
            other => other,
        }
    }
}

#[async_trait]
impl JobQuery for DashboardClient {
    async fn fetch_job_summaries(&self, limit: Option<u32>) -> Result<Vec<JobSummary>> {
        self.list_job_summaries(limit).await
    }

    async fn fetch_job_by_id(&self, job_id: Uuid) -> Result<Job> {
        self.get_job(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_omits_missing_limit() {
        let client = DashboardClient::new("http://localhost:8000");
        let request = client
            .get("/api/jobs")
            .query(&ListJobsQuery {
                minimal: true,
                limit: None,
            })
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("minimal=true"));
    }

    #[test]
    fn test_list_query_with_limit() {
        let client = DashboardClient::new("http://localhost:8000");
        let request = client
            .get("/api/jobs")
            .query(&ListJobsQuery {
                minimal: true,
                limit: Some(25),
            })
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("minimal=true&limit=25"));
    }

    #[tokio::test]
    async fn test_malformed_base_url_is_request_failure() {
        // Rejected while building the request, before any connection
        let client = DashboardClient::new("not a url");
        let err = client.list_job_summaries(None).await.unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(_)));
        assert!(!err.is_not_found());
    }
}
