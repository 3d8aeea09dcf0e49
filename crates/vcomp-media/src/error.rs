//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing or encoding.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too small ({size} bytes), likely not a valid video: {path}")]
    InputTooSmall { path: PathBuf, size: u64 },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Video too short ({0:.2} seconds), minimum is 0.1 seconds")]
    TooShort(f64),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Output file was not created: {0}")]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    pub fn invalid_duration(message: impl Into<String>) -> Self {
        Self::InvalidDuration(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// One-line description including the tail of captured stderr, if any.
    pub fn detail(&self) -> String {
        match self {
            MediaError::FfmpegFailed {
                stderr: Some(stderr),
                ..
            }
            | MediaError::FfprobeFailed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => {
                let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
                format!("{} ({})", self, last.trim())
            }
            _ => self.to_string(),
        }
    }
}
