//! Progress and status events delivered to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::{BatchId, JobOutcome};
use crate::queue_item::{ColorHint, ItemStatus};
use crate::settings::Preset;
use crate::summary::BatchSummary;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Timeout,
}

/// Event envelope emitted by the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    /// A batch run began
    BatchStarted {
        #[serde(rename = "batchId")]
        batch_id: BatchId,
        total: usize,
        preset: Preset,
    },

    /// An item is about to be compressed (index is zero-based)
    ItemStarted {
        index: usize,
        total: usize,
        filename: String,
    },

    /// An item changed status
    StatusChanged {
        path: PathBuf,
        status: ItemStatus,
        #[serde(rename = "colorHint")]
        color_hint: ColorHint,
    },

    /// Encoder progress within the current item (0-100)
    EncodeProgress { index: usize, percent: u8 },

    /// An item finished processing
    ItemFinished {
        index: usize,
        total: usize,
        filename: String,
        outcome: JobOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// Free-form log line
    Log {
        level: LogLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The batch ended
    Finished(BatchSummary),
}

impl BatchEvent {
    pub fn status_changed(path: impl Into<PathBuf>, status: ItemStatus) -> Self {
        BatchEvent::StatusChanged {
            path: path.into(),
            status,
            color_hint: status.color_hint(),
        }
    }

    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        BatchEvent::Log {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchEvent::Finished(_))
    }
}
