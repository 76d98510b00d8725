//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job status as reported by the jobs API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    /// Returns true once no further status transition is expected
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Lowercase wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal job projection used by the dashboard list
///
/// Served by the list endpoint in minimal mode to keep bulk payloads small.
/// A summary is never widened back into a [`Job`]: fields it does not carry
/// are simply unknown to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
    pub agent_identifier: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Full job record, as shown by the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    pub agent_identifier: String,
    pub status: JobStatus,
    #[serde(default)]
    pub priority: Option<i32>,
    /// Agent input payload, shape defined by the agent's schema
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Wall-clock run time, once the job has both started and finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => Some(completed.signed_duration_since(started)),
            _ => None,
        }
    }
}

/// Lossy projection of a full record onto the list payload
impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            updated_at: job.updated_at,
            agent_identifier: job.agent_identifier.clone(),
            title: job.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_summary_deserializes_camel_case() {
        let json = serde_json::json!({
            "id": "6f1c1f43-3f55-4a8e-9d0e-2f4a8d1f2c11",
            "status": "running",
            "updatedAt": "2024-05-01T10:00:00Z",
            "agentIdentifier": "web-scraper",
            "title": "Nightly crawl"
        });

        let summary: JobSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.status, JobStatus::Running);
        assert_eq!(summary.agent_identifier, "web-scraper");
        assert_eq!(summary.title.as_deref(), Some("Nightly crawl"));
    }

    #[test]
    fn test_job_optional_fields_default() {
        let json = serde_json::json!({
            "id": "6f1c1f43-3f55-4a8e-9d0e-2f4a8d1f2c11",
            "agentIdentifier": "summarizer",
            "status": "completed",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:05:00Z",
            "startedAt": "2024-05-01T10:01:00Z",
            "completedAt": "2024-05-01T10:04:30Z"
        });

        let job: Job = serde_json::from_value(json).unwrap();
        assert!(job.title.is_none());
        assert!(job.priority.is_none());
        assert!(job.result.is_none());
        assert_eq!(job.duration().map(|d| d.num_seconds()), Some(210));
    }

    #[test]
    fn test_projection_keeps_identity_fields() {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: Some("Resize images".to_string()),
            agent_identifier: "image-worker".to_string(),
            status: JobStatus::Failed,
            priority: Some(1),
            data: serde_json::json!({ "bucket": "uploads" }),
            result: None,
            error: Some("out of memory".to_string()),
            created_at: now,
            updated_at: now,
            started_at: Some(now),
            completed_at: None,
        };

        let summary = JobSummary::from(&job);
        assert_eq!(summary.id, job.id);
        assert_eq!(summary.status, JobStatus::Failed);
        assert_eq!(summary.updated_at, now);
        assert_eq!(summary.title, job.title);
    }
}
