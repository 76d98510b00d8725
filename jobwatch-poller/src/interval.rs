//! Interval policy
//!
//! Maps the latest snapshot to the delay before the next poll.

use std::time::Duration;

use jobwatch_core::domain::job::{Job, JobSummary};

/// Delay before the next dashboard poll
///
/// Polls at `base` while any job is still pending or running and at twice
/// `base` once everything has settled (an empty dashboard counts as
/// settled).
pub fn bulk_interval(jobs: &[JobSummary], base: Duration) -> Duration {
    if jobs.iter().any(|job| !job.status.is_terminal()) {
        base
    } else {
        base.saturating_mul(2)
    }
}

/// Delay before the next detail poll, or `None` once the job is terminal
pub fn single_job_interval(job: &Job, base: Duration) -> Option<Duration> {
    (!job.status.is_terminal()).then_some(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobwatch_core::domain::job::JobStatus;
    use uuid::Uuid;

    const BASE: Duration = Duration::from_millis(5000);

    fn summary(status: JobStatus) -> JobSummary {
        JobSummary {
            id: Uuid::new_v4(),
            status,
            updated_at: Utc::now(),
            agent_identifier: "agent".to_string(),
            title: None,
        }
    }

    fn job(status: JobStatus) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            title: None,
            agent_identifier: "agent".to_string(),
            status,
            priority: None,
            data: serde_json::Value::Null,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_active_jobs_keep_base_interval() {
        let jobs = vec![summary(JobStatus::Completed), summary(JobStatus::Pending)];
        assert_eq!(bulk_interval(&jobs, BASE), BASE);
    }

    #[test]
    fn test_settled_jobs_slow_down() {
        let jobs = vec![
            summary(JobStatus::Completed),
            summary(JobStatus::Failed),
            summary(JobStatus::Cancelled),
        ];
        assert_eq!(bulk_interval(&jobs, BASE), Duration::from_millis(10_000));
    }

    #[test]
    fn test_empty_dashboard_slows_down() {
        assert_eq!(bulk_interval(&[], BASE), Duration::from_millis(10_000));
    }

    #[test]
    fn test_single_job_stops_when_terminal() {
        assert_eq!(single_job_interval(&job(JobStatus::Running), BASE), Some(BASE));
        assert_eq!(single_job_interval(&job(JobStatus::Pending), BASE), Some(BASE));
        assert_eq!(single_job_interval(&job(JobStatus::Completed), BASE), None);
        assert_eq!(single_job_interval(&job(JobStatus::Failed), BASE), None);
        assert_eq!(single_job_interval(&job(JobStatus::Cancelled), BASE), None);
    }
}
