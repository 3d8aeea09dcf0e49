//! Batch identifiers and per-job results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl BatchId {
    /// Generate a new random batch ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a single job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Success,
    Failure,
    Timeout,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failure => "failure",
            JobOutcome::Timeout => "timeout",
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one supervised encode.
///
/// Produced by the job runner and consumed immediately by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub outcome: JobOutcome,
    /// Failure or timeout detail
    pub error_detail: Option<String>,
    /// Wall-clock time observed by the runner
    pub elapsed: Duration,
    /// Size of the written output, on success
    pub output_size_bytes: Option<u64>,
}

impl JobResult {
    pub fn success(output_size_bytes: u64, elapsed: Duration) -> Self {
        Self {
            outcome: JobOutcome::Success,
            error_detail: None,
            elapsed,
            output_size_bytes: Some(output_size_bytes),
        }
    }

    pub fn failure(detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            outcome: JobOutcome::Failure,
            error_detail: Some(detail.into()),
            elapsed,
            output_size_bytes: None,
        }
    }

    pub fn timeout(deadline: Duration, elapsed: Duration) -> Self {
        Self {
            outcome: JobOutcome::Timeout,
            error_detail: Some(format!(
                "exceeded processing time limit ({:.1} min)",
                deadline.as_secs_f64() / 60.0
            )),
            elapsed,
            output_size_bytes: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == JobOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn test_job_result_constructors() {
        let ok = JobResult::success(1024, Duration::from_secs(3));
        assert!(ok.is_success());
        assert_eq!(ok.output_size_bytes, Some(1024));
        assert!(ok.error_detail.is_none());

        let failed = JobResult::failure("codec error", Duration::from_secs(1));
        assert_eq!(failed.outcome, JobOutcome::Failure);
        assert_eq!(failed.error_detail.as_deref(), Some("codec error"));

        let timed_out = JobResult::timeout(Duration::from_secs(240), Duration::from_secs(240));
        assert_eq!(timed_out.outcome, JobOutcome::Timeout);
        assert!(timed_out.error_detail.unwrap().contains("4.0 min"));
    }
}
