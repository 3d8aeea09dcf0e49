//! Sequential batch orchestration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, warn, Instrument};

use vcomp_media::{output_path_for, validate_duration, DurationProbe, Encoder, MediaError};
use vcomp_models::{
    BatchEvent, BatchId, BatchSummary, CompressionSettings, ItemStatus, JobOutcome, JobResult,
    LogLevel,
};
use vcomp_queue::{JobQueue, ProgressChannel};

use crate::error::{WorkerError, WorkerResult};
use crate::job::CompressJob;
use crate::logging::ItemLogger;
use crate::metrics;
use crate::runner::JobRunner;
use crate::timeout::{estimate_timeout, DEFAULT_TIMEOUT_SECS};

/// Requests a cooperative stop of a running batch.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    /// Ask the batch to stop at the next item boundary.
    ///
    /// Requested while no batch is running, it stops the next batch before
    /// its first item.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Drives a [`JobQueue`] through compression, one item at a time.
///
/// Per item: `Pending -> Processing -> {Done | Error | Timeout}`, or back to
/// `Pending` when the batch is aborted mid-item.
pub struct BatchOrchestrator {
    encoder: Arc<dyn Encoder>,
    probe: Arc<dyn DurationProbe>,
    events: ProgressChannel,
    runner: JobRunner,
    abort: Arc<watch::Sender<bool>>,
    default_job_timeout: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        encoder: Arc<dyn Encoder>,
        probe: Arc<dyn DurationProbe>,
        events: ProgressChannel,
    ) -> Self {
        let (abort, _) = watch::channel(false);
        Self {
            encoder,
            probe,
            events,
            runner: JobRunner::new(),
            abort: Arc::new(abort),
            default_job_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Deadline used when the primary probe cannot determine the duration.
    pub fn with_default_job_timeout(mut self, timeout: Duration) -> Self {
        self.default_job_timeout = timeout;
        self
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            tx: Arc::clone(&self.abort),
        }
    }

    /// Request a cooperative stop. Checked before and after each item.
    pub fn abort(&self) {
        self.abort.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.abort.borrow()
    }

    /// Compress every item of `queue` that is not already done.
    ///
    /// Fails only before iteration begins: on an empty queue or invalid
    /// settings. Per-item failures are recorded in the queue and summary.
    /// Items already `Done` are skipped and counted as successes, so running
    /// again after an abort resumes where the previous run stopped. An abort
    /// is consumed by the run it stops.
    pub async fn start(
        &self,
        queue: &mut JobQueue,
        settings: &CompressionSettings,
    ) -> WorkerResult<BatchSummary> {
        if queue.is_empty() {
            return Err(WorkerError::EmptyQueue);
        }
        settings
            .validate()
            .map_err(|e| WorkerError::invalid_settings(e.to_string()))?;

        let batch_id = BatchId::new();
        let total = queue.len();
        let mut summary = BatchSummary::new(total);

        info!(
            batch_id = %batch_id,
            total,
            target_mb = settings.target_size_mb,
            preset = %settings.preset,
            "Starting batch"
        );
        self.events.publish(BatchEvent::BatchStarted {
            batch_id: batch_id.clone(),
            total,
            preset: settings.preset,
        });
        self.events.log(
            LogLevel::Info,
            format!(
                "Starting batch of {} videos (target {} MB, preset {})",
                total, settings.target_size_mb, settings.preset
            ),
        );

        for index in 0..total {
            if self.is_aborted() {
                summary.aborted = true;
                break;
            }

            let Some(item) = queue.get(index) else { break };
            if item.is_done() {
                summary.record_already_done();
                continue;
            }

            let input = item.path.clone();
            let name = item.display_name.clone();
            let filename = item.file_name();
            let logger = ItemLogger::new(&batch_id, index, &name, self.events.clone());

            queue.set_status(index, ItemStatus::Processing);
            self.events.status_changed(&input, ItemStatus::Processing);
            self.events.item_started(index, total, filename.clone());

            let outcome = self
                .process_item(input.clone(), settings, logger.clone())
                .instrument(logger.span())
                .await;

            if self.is_aborted() {
                // The in-flight item is not counted and will be retried.
                queue.set_status(index, ItemStatus::Pending);
                self.events.status_changed(&input, ItemStatus::Pending);
                logger.aborted();
                summary.aborted = true;
                break;
            }

            let status = match outcome.outcome {
                JobOutcome::Success => ItemStatus::Done,
                JobOutcome::Failure => ItemStatus::Error,
                JobOutcome::Timeout => ItemStatus::Timeout,
            };
            queue.set_status(index, status);
            summary.record(outcome.outcome);
            metrics::record_job(outcome.outcome, outcome.elapsed.as_secs_f64());
            logger.finished(&outcome);

            self.events.status_changed(&input, status);
            self.events.item_finished(
                index,
                total,
                filename,
                outcome.outcome,
                outcome.error_detail.clone(),
            );
        }

        self.abort.send_replace(false);

        info!(
            batch_id = %batch_id,
            succeeded = summary.success_count,
            failed = summary.error_count,
            timed_out = summary.timeout_count,
            aborted = summary.aborted,
            "Batch finished"
        );
        let level = if summary.aborted || summary.has_failures() {
            LogLevel::Warning
        } else {
            LogLevel::Success
        };
        self.events.log(level, summary.status_message());
        self.events.finished(summary);

        Ok(summary)
    }

    /// Probe, pick a deadline and run one item's job.
    ///
    /// A duration that cannot be read falls back to the encoder's metadata
    /// read inside the job. One that was read but is unusable fails the item
    /// without encoding.
    async fn process_item(
        &self,
        input: PathBuf,
        settings: &CompressionSettings,
        logger: ItemLogger,
    ) -> JobResult {
        let started = Instant::now();
        logger.started(&input);

        let duration = match self.probe.duration(&input).await.and_then(validate_duration) {
            Ok(duration) => Some(duration),
            Err(e @ (MediaError::InvalidDuration(_) | MediaError::TooShort(_))) => {
                let detail = WorkerError::probe_failure(e.detail()).to_string();
                return JobResult::failure(detail, started.elapsed());
            }
            Err(e) => {
                logger.duration_unreadable(&e);
                None
            }
        };

        let deadline = match duration.map(estimate_timeout) {
            Some(Ok(estimate)) => {
                logger.deadline_estimated(&estimate);
                estimate.deadline()
            }
            Some(Err(e)) => {
                warn!(error = %e, "Falling back to default deadline");
                self.default_job_timeout
            }
            None => {
                logger.deadline_default(self.default_job_timeout);
                self.default_job_timeout
            }
        };

        let job = CompressJob {
            output: output_path_for(&input, &settings.suffix, settings.output_dir()),
            input,
            duration,
            settings: settings.clone(),
            encoder: Arc::clone(&self.encoder),
            logger,
        };

        self.runner.run(deadline, |abandoned| job.run(abandoned)).await
    }
}
