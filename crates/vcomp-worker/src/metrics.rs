//! Prometheus metrics for batch compression.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use vcomp_models::JobOutcome;

use crate::bitrate::BitrateClamp;

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "vcomp_jobs_total";
    pub const JOB_DURATION_SECONDS: &str = "vcomp_job_duration_seconds";
    pub const BITRATE_CLAMPED_TOTAL: &str = "vcomp_bitrate_clamped_total";
}

/// Record a finished job.
pub fn record_job(outcome: JobOutcome, duration_secs: f64) {
    let labels = [("outcome", outcome.as_str().to_string())];
    counter!(names::JOBS_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a clamped bitrate.
pub fn record_bitrate_clamped(bound: BitrateClamp) {
    let labels = [("bound", bound.as_str().to_string())];
    counter!(names::BITRATE_CLAMPED_TOTAL, &labels).increment(1);
}
