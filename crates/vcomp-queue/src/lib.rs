//! In-memory compression queue and batch event channel.
//!
//! This crate provides:
//! - An ordered job queue keyed by file path, rejecting duplicates
//! - An unbounded event channel carrying [`vcomp_models::BatchEvent`]s to the
//!   presentation layer

pub mod error;
pub mod progress;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use progress::{EventReceiver, ProgressChannel};
pub use queue::JobQueue;
