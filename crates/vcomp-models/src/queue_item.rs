//! Queue item model.
//!
//! A queue item is one video waiting to be (or already) compressed. The
//! queue owns its items; the orchestrator is the only writer of `status`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum number of characters shown for a file name.
pub const DISPLAY_NAME_MAX_CHARS: usize = 40;

/// Lifecycle status of a queued video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting to be processed
    #[default]
    Pending,
    /// Currently being compressed
    Processing,
    /// Compressed successfully
    Done,
    /// Compression failed
    Error,
    /// Compression exceeded its deadline and was abandoned
    Timeout,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
            ItemStatus::Timeout => "timeout",
        }
    }

    /// Human label used by status sinks.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Processing => "Processing...",
            ItemStatus::Done => "Done",
            ItemStatus::Error => "Error",
            ItemStatus::Timeout => "Timeout",
        }
    }

    /// Whether the item finished (successfully or not) in the current run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Error | ItemStatus::Timeout)
    }

    /// Presentation hint for this status.
    pub fn color_hint(&self) -> ColorHint {
        match self {
            ItemStatus::Pending => ColorHint::Neutral,
            ItemStatus::Processing => ColorHint::Accent,
            ItemStatus::Done => ColorHint::Success,
            ItemStatus::Error | ItemStatus::Timeout => ColorHint::Danger,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Colour hint attached to status-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorHint {
    Neutral,
    Accent,
    Success,
    Danger,
}

/// A video in the compression queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Source file path (unique within a queue)
    pub path: PathBuf,
    /// Current status
    pub status: ItemStatus,
    /// Truncated file name for display
    pub display_name: String,
    /// Source file size, if it could be read
    pub size_bytes: Option<u64>,
}

impl QueueItem {
    /// Create a pending item, reading the file size from disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
        Self::with_size(path, size_bytes)
    }

    /// Create a pending item with a known size.
    pub fn with_size(path: impl Into<PathBuf>, size_bytes: Option<u64>) -> Self {
        let path = path.into();
        let display_name = display_name_for(&path);
        Self {
            path,
            status: ItemStatus::Pending,
            display_name,
            size_bytes,
        }
    }

    /// Full file name (not truncated).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Size formatted as megabytes, e.g. `"12.34 MB"`.
    pub fn size_text(&self) -> String {
        match self.size_bytes {
            Some(bytes) => format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)),
            None => "Unknown size".to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == ItemStatus::Done
    }
}

/// File name truncated to [`DISPLAY_NAME_MAX_CHARS`].
pub fn display_name_for(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    if name.chars().count() > DISPLAY_NAME_MAX_CHARS {
        let head: String = name.chars().take(DISPLAY_NAME_MAX_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_pending() {
        let item = QueueItem::with_size("/videos/clip.mp4", Some(2048));
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.display_name, "clip.mp4");
        assert_eq!(item.file_name(), "clip.mp4");
    }

    #[test]
    fn test_display_name_truncation() {
        let long = format!("/videos/{}.mp4", "a".repeat(60));
        let item = QueueItem::with_size(long, None);
        assert_eq!(item.display_name.chars().count(), DISPLAY_NAME_MAX_CHARS);
        assert!(item.display_name.ends_with("..."));
        assert!(item.file_name().len() > DISPLAY_NAME_MAX_CHARS);
    }

    #[test]
    fn test_size_text() {
        let item = QueueItem::with_size("a.mp4", Some(5 * 1024 * 1024 + 512 * 1024));
        assert_eq!(item.size_text(), "5.50 MB");

        let unknown = QueueItem::with_size("b.mp4", None);
        assert_eq!(unknown.size_text(), "Unknown size");
    }

    #[test]
    fn test_missing_file_has_unknown_size() {
        let item = QueueItem::new("/definitely/not/here.mov");
        assert!(item.size_bytes.is_none());
    }

    #[test]
    fn test_status_color_hints() {
        assert_eq!(ItemStatus::Pending.color_hint(), ColorHint::Neutral);
        assert_eq!(ItemStatus::Processing.color_hint(), ColorHint::Accent);
        assert_eq!(ItemStatus::Done.color_hint(), ColorHint::Success);
        assert_eq!(ItemStatus::Error.color_hint(), ColorHint::Danger);
        assert_eq!(ItemStatus::Timeout.color_hint(), ColorHint::Danger);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ItemStatus::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
        assert!(ItemStatus::Done.is_terminal());
        assert!(!ItemStatus::Processing.is_terminal());
    }
}
