//! Benchmark Job Records
//!
//! One job per benchmark attempt. Jobs are created at trigger time, mutated
//! in place as they progress, and retained indefinitely in the job table.

use crate::bench::result::BenchmarkResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What caused a benchmark to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// First benchmark right after registration
    Initial,
    /// Tier interval elapsed (or provider never benchmarked)
    Scheduled,
    /// Probabilistic spot audit
    Random,
    /// Operator-requested
    Manual,
}

/// Job lifecycle: `pending -> running -> completed | failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkJob {
    pub id: String,
    pub provider_id: String,
    pub trigger: TriggerKind,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<BenchmarkResult>,
    pub error: Option<String>,
}

impl BenchmarkJob {
    pub fn new(provider_id: String, trigger: TriggerKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            trigger,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    /// Entered immediately before the executor call
    pub fn mark_running(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Running;
        self.started_at = Some(now);
    }

    /// Entered when the executor returns, with the result attached
    pub fn complete(&mut self, result: BenchmarkResult, now: DateTime<Utc>) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(now);
    }

    /// Terminal failure: the executor call errored
    pub fn fail(&mut self, error: String, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.error = Some(error);
        self.completed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.started_at.is_none());

        let now = Utc::now();
        job.mark_running(now);
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.started_at, Some(now));

        job.fail("connection refused".to_string(), now);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("connection refused"));
        assert!(job.result.is_none());
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Manual);
        let b = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Manual);
        assert_ne!(a.id, b.id);
    }
}
