//! Batch video compression worker.
//!
//! Runs a queue of videos through a size-targeted encoder one at a time,
//! each under its own deadline, and reports progress as [`vcomp_models::BatchEvent`]s.

pub mod bitrate;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod runner;
pub mod timeout;

pub use bitrate::{calculate_bitrate, Bitrate, BitrateClamp};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use job::CompressJob;
pub use logging::ItemLogger;
pub use orchestrator::{AbortHandle, BatchOrchestrator};
pub use runner::{Abandoned, JobRunner};
pub use timeout::{estimate_timeout, TimeoutEstimate};
