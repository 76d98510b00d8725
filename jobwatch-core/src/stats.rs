//! Dashboard statistics
//!
//! Per-status counts computed from the latest bulk snapshot.

use std::collections::HashMap;

use crate::domain::job::{JobStatus, JobSummary};

/// Number of jobs in each status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStats {
    counts: HashMap<JobStatus, usize>,
}

impl JobStats {
    /// Counts the jobs of a bulk snapshot
    pub fn from_summaries(jobs: &[JobSummary]) -> Self {
        let mut counts = HashMap::new();
        for job in jobs {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Jobs currently in `status`
    pub fn count(&self, status: JobStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Jobs that have not reached a terminal status
    pub fn active(&self) -> usize {
        self.counts
            .iter()
            .filter(|(status, _)| !status.is_terminal())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
