//! Processing deadline estimation.

use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Fixed overhead added to the expected encode time, in seconds.
pub const BASE_OVERHEAD_SECS: f64 = 60.0;
/// Safety buffer on top of the expected time, in seconds.
pub const SAFETY_BUFFER_SECS: f64 = 120.0;
/// Hard cap on any single job, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 900;
/// Deadline used when the duration cannot be determined.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Deadline for one job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeoutEstimate {
    /// Expected processing time in seconds, before buffer and cap
    pub expected_secs: f64,
    /// Deadline in whole seconds
    pub max_secs: u64,
}

impl TimeoutEstimate {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }

    pub fn is_capped(&self) -> bool {
        self.max_secs == MAX_TIMEOUT_SECS
    }
}

/// Estimate the deadline for encoding a `duration`-second video.
///
/// `expected = duration * 2 + 60`, plus a 120 s buffer, capped at 900 s.
pub fn estimate_timeout(duration: f64) -> WorkerResult<TimeoutEstimate> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(WorkerError::invalid_input(format!(
            "duration must be positive, got {}",
            duration
        )));
    }

    let expected_secs = duration * 2.0 + BASE_OVERHEAD_SECS;
    let with_buffer = expected_secs + SAFETY_BUFFER_SECS;
    let max_secs = (with_buffer as u64).min(MAX_TIMEOUT_SECS);

    Ok(TimeoutEstimate {
        expected_secs,
        max_secs,
    })
}
