//! Per-item lifecycle logging.
//!
//! Each item of a batch gets an [`ItemLogger`]. It writes the item's
//! lifecycle to `tracing` and mirrors the lines a user should see onto the
//! batch event stream. Once the runner abandons the item's job, the logger
//! stops publishing events so a detached job cannot interleave with the
//! items after it.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn, Span};

use vcomp_media::MediaError;
use vcomp_models::{BatchId, JobOutcome, JobResult, LogLevel};
use vcomp_queue::ProgressChannel;

use crate::bitrate::Bitrate;
use crate::metrics;
use crate::runner::Abandoned;
use crate::timeout::TimeoutEstimate;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone)]
pub struct ItemLogger {
    batch_id: BatchId,
    index: usize,
    name: String,
    events: ProgressChannel,
    abandoned: Abandoned,
}

impl ItemLogger {
    pub fn new(batch_id: &BatchId, index: usize, name: &str, events: ProgressChannel) -> Self {
        Self {
            batch_id: batch_id.clone(),
            index,
            name: name.to_string(),
            events,
            abandoned: Abandoned::default(),
        }
    }

    /// A copy that goes quiet on the event stream once `abandoned` is set.
    pub fn until_abandoned(&self, abandoned: Abandoned) -> Self {
        Self {
            abandoned,
            ..self.clone()
        }
    }

    pub fn span(&self) -> Span {
        tracing::info_span!(
            "item",
            batch_id = %self.batch_id,
            index = self.index,
            name = %self.name
        )
    }

    pub fn started(&self, input: &Path) {
        info!(input = %input.display(), "Compressing {}", self.name);
    }

    pub fn duration_unreadable(&self, err: &MediaError) {
        warn!(error = %err.detail(), "Duration probe failed; trying encoder metadata");
    }

    pub fn duration_from_metadata(&self, duration: f64) {
        info!(duration_secs = duration, "Duration read from encoder metadata");
    }

    pub fn deadline_estimated(&self, estimate: &TimeoutEstimate) {
        info!(
            expected_secs = estimate.expected_secs,
            max_secs = estimate.max_secs,
            capped = estimate.is_capped(),
            "Deadline from duration"
        );
        self.publish_log(
            LogLevel::Info,
            format!(
                "{}: expected {:.1} min, max allowed {:.1} min",
                self.name,
                estimate.expected_secs / 60.0,
                estimate.max_secs as f64 / 60.0
            ),
        );
    }

    pub fn deadline_default(&self, deadline: Duration) {
        info!(
            deadline_secs = deadline.as_secs(),
            "Duration unknown; using the default deadline"
        );
    }

    /// Records the chosen bitrates; a clamped bitrate is also a user-facing warning.
    pub fn bitrate(&self, duration: f64, bitrate: &Bitrate) {
        info!(
            duration_secs = duration,
            video_kbps = bitrate.video_kbps,
            audio_kbps = bitrate.audio_kbps,
            "Bitrate chosen"
        );
        if !bitrate.was_clamped() {
            return;
        }

        warn!(
            raw_kbps = bitrate.raw_video_kbps,
            video_kbps = bitrate.video_kbps,
            bound = bitrate.clamp.as_str(),
            "Video bitrate clamped"
        );
        metrics::record_bitrate_clamped(bitrate.clamp);
        self.publish_log(
            LogLevel::Warning,
            format!(
                "Bitrate for {} clamped to {} kbps (wanted {} kbps)",
                self.name, bitrate.video_kbps, bitrate.raw_video_kbps
            ),
        );
    }

    pub fn encode_progress(&self, percent: u8) {
        if !self.abandoned.is_set() {
            self.events.encode_progress(self.index, percent);
        }
    }

    pub fn oversized(&self, size_bytes: u64, target_mb: f64) {
        let size_mb = size_bytes as f64 / BYTES_PER_MB;
        warn!(size_mb, target_mb, "Output above target size");
        self.publish_log(
            LogLevel::Warning,
            format!(
                "{} is {:.2} MB, above the {:.2} MB target",
                self.name, size_mb, target_mb
            ),
        );
    }

    pub fn finished(&self, result: &JobResult) {
        let elapsed_secs = result.elapsed.as_secs_f64();
        match (&result.outcome, &result.error_detail) {
            (JobOutcome::Success, _) | (_, None) => {
                info!(
                    elapsed_secs,
                    output_bytes = result.output_size_bytes,
                    "Compressed {}",
                    self.name
                );
                self.publish_log(
                    LogLevel::Success,
                    format!("Successfully compressed: {}", self.name),
                );
            }
            (JobOutcome::Timeout, Some(detail)) => {
                warn!(elapsed_secs, "Timed out: {}", detail);
                self.publish_log(LogLevel::Timeout, format!("{}: {}", self.name, detail));
            }
            (JobOutcome::Failure, Some(detail)) => {
                error!(elapsed_secs, "Failed: {}", detail);
                self.publish_log(LogLevel::Error, format!("{}: {}", self.name, detail));
            }
        }
    }

    pub fn aborted(&self) {
        warn!("Batch aborted; {} reset to pending", self.name);
    }

    fn publish_log(&self, level: LogLevel, message: String) {
        if !self.abandoned.is_set() {
            self.events.log(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrate::calculate_bitrate;
    use vcomp_models::BatchEvent;

    fn logger() -> (ItemLogger, vcomp_queue::EventReceiver) {
        let (events, rx) = ProgressChannel::new();
        (ItemLogger::new(&BatchId::new(), 2, "holiday.mp4", events), rx)
    }

    #[test]
    fn test_finished_publishes_outcome_line() {
        let (logger, mut rx) = logger();
        logger.finished(&JobResult::success(4096, Duration::from_secs(3)));
        logger.finished(&JobResult::failure("moov atom not found", Duration::ZERO));

        let lines: Vec<(LogLevel, String)> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|e| match e {
                BatchEvent::Log { level, message, .. } => Some((level, message)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                (LogLevel::Success, "Successfully compressed: holiday.mp4".to_string()),
                (LogLevel::Error, "holiday.mp4: moov atom not found".to_string()),
            ]
        );
    }

    #[test]
    fn test_clamped_bitrate_is_a_warning() {
        let (logger, mut rx) = logger();
        logger.bitrate(30.0, &calculate_bitrate(30.0, 10.0).unwrap());
        assert!(rx.try_recv().is_err());

        logger.bitrate(600.0, &calculate_bitrate(600.0, 5.0).unwrap());
        assert!(matches!(
            rx.try_recv(),
            Ok(BatchEvent::Log { level: LogLevel::Warning, message, .. })
                if message == "Bitrate for holiday.mp4 clamped to 400 kbps (wanted 62 kbps)"
        ));
    }

    #[test]
    fn test_abandoned_logger_goes_quiet() {
        let (logger, mut rx) = logger();
        let abandoned = Abandoned::default();
        let job_logger = logger.until_abandoned(abandoned.clone());

        job_logger.encode_progress(40);
        assert!(matches!(
            rx.try_recv(),
            Ok(BatchEvent::EncodeProgress { index: 2, percent: 40 })
        ));

        abandoned.set();
        job_logger.encode_progress(80);
        job_logger.oversized(12 * 1024 * 1024, 10.0);
        assert!(rx.try_recv().is_err());

        // The orchestrator's own copy is unaffected.
        logger.finished(&JobResult::success(1, Duration::ZERO));
        assert!(rx.try_recv().is_ok());
    }
}
