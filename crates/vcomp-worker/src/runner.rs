//! Deadline-bounded job execution.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use vcomp_models::JobResult;

/// Detail reported when a job dies without sending a result.
pub const TERMINATED_DETAIL: &str = "job terminated unexpectedly";

/// Set once the runner has stopped waiting for a job.
///
/// A detached job must stop publishing batch events when this is set, since
/// the batch has already moved on to the next item.
#[derive(Debug, Clone, Default)]
pub struct Abandoned(Arc<AtomicBool>);

impl Abandoned {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Runs one job on its own task and waits for it up to a deadline.
///
/// A job still running at the deadline is reported as a timeout and
/// detached, not killed. It keeps running in the background until it
/// finishes on its own, and may keep consuming CPU and disk while the
/// batch moves on to the next item.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobRunner;

impl JobRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `job` under `deadline` and report exactly one [`JobResult`].
    ///
    /// `job` receives the [`Abandoned`] flag this runner sets on timeout and
    /// resolves to the output size in bytes, or a failure detail.
    pub async fn run<J, F>(&self, deadline: Duration, job: J) -> JobResult
    where
        J: FnOnce(Abandoned) -> F,
        F: Future<Output = Result<u64, String>> + Send + 'static,
    {
        let started = Instant::now();
        let (tx, rx) = oneshot::channel();
        let abandoned = Abandoned::default();
        let job = job(abandoned.clone());

        // Dropping the JoinHandle detaches the task.
        tokio::spawn(async move {
            let result = job.await;
            if tx.send(result).is_err() {
                debug!("Job finished after its runner gave up");
            }
        });

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(Ok(output_size))) => JobResult::success(output_size, started.elapsed()),
            Ok(Ok(Err(detail))) => JobResult::failure(detail, started.elapsed()),
            Ok(Err(_)) => JobResult::failure(TERMINATED_DETAIL, started.elapsed()),
            Err(_) => {
                abandoned.set();
                warn!(
                    deadline_secs = deadline.as_secs(),
                    "Job exceeded its deadline; leaving it running in the background"
                );
                JobResult::timeout(deadline, started.elapsed())
            }
        }
    }
}
