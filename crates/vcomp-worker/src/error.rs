//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Queue is empty")]
    EmptyQueue,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Could not determine video duration: {0}")]
    ProbeFailure(String),

    #[error("Encode failed: {0}")]
    EncodeFailure(String),

    #[error("Model error: {0}")]
    Model(#[from] vcomp_models::ModelError),

    #[error("Media error: {0}")]
    Media(#[from] vcomp_media::MediaError),

    #[error("Queue error: {0}")]
    Queue(#[from] vcomp_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }

    pub fn probe_failure(msg: impl Into<String>) -> Self {
        Self::ProbeFailure(msg.into())
    }

    pub fn encode_failure(msg: impl Into<String>) -> Self {
        Self::EncodeFailure(msg.into())
    }
}
