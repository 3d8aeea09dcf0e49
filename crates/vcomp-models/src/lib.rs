//! Shared data models for the vcomp batch compressor.
//!
//! This crate provides Serde-serializable types for:
//! - Queue items and their lifecycle status
//! - Per-batch compression settings
//! - Job results and batch summaries
//! - Progress/status events delivered to the presentation layer

pub mod error;
pub mod events;
pub mod job;
pub mod queue_item;
pub mod settings;
pub mod summary;

pub use error::{ModelError, ModelResult};
pub use events::{BatchEvent, LogLevel};
pub use job::{BatchId, JobOutcome, JobResult};
pub use queue_item::{ColorHint, ItemStatus, QueueItem};
pub use settings::{CompressionSettings, Preset, DEFAULT_SUFFIX, DEFAULT_TARGET_SIZE_MB};
pub use summary::BatchSummary;
