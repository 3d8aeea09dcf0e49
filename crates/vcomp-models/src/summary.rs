//! Batch summary.

use serde::{Deserialize, Serialize};

use crate::job::JobOutcome;

/// Aggregate counts for one batch run.
///
/// `success_count + error_count <= total` holds throughout a run; equality
/// holds when the run was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub success_count: usize,
    /// Failures, timeouts included
    pub error_count: usize,
    /// Timeouts only (subset of `error_count`)
    pub timeout_count: usize,
    pub total: usize,
    pub aborted: bool,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Count one finished job.
    pub fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Success => self.success_count += 1,
            JobOutcome::Failure => self.error_count += 1,
            JobOutcome::Timeout => {
                self.error_count += 1;
                self.timeout_count += 1;
            }
        }
    }

    /// Count an item that was already done in a previous run.
    pub fn record_already_done(&mut self) {
        self.success_count += 1;
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn all_succeeded(&self) -> bool {
        !self.aborted && self.success_count == self.total
    }

    pub fn has_failures(&self) -> bool {
        self.error_count > 0
    }

    /// Fraction of the batch that has been processed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.processed() as f64 / self.total as f64).min(1.0)
    }

    /// Human-readable final status line.
    pub fn status_message(&self) -> String {
        if self.aborted {
            format!(
                "Aborted by user: {} succeeded, {} failed out of {} videos.",
                self.success_count, self.error_count, self.total
            )
        } else if self.has_failures() {
            format!(
                "Batch Finished: {} succeeded, {} failed out of {} videos.",
                self.success_count, self.error_count, self.total
            )
        } else {
            format!(
                "Batch Finished: {}/{} videos compressed successfully!",
                self.success_count, self.total
            )
        }
    }
}
