//! Batch events delivered to the presentation layer.

use std::path::Path;
use tokio::sync::mpsc;
use tracing::trace;

use vcomp_models::{BatchEvent, BatchSummary, ItemStatus, JobOutcome, LogLevel};

/// Receiving half handed to the presentation layer.
pub type EventReceiver = mpsc::UnboundedReceiver<BatchEvent>;

/// Sending half of the batch event stream.
///
/// Sends never fail the batch: once the receiver is dropped, events are
/// discarded.
#[derive(Debug, Clone)]
pub struct ProgressChannel {
    tx: mpsc::UnboundedSender<BatchEvent>,
}

impl ProgressChannel {
    /// Create a channel and its receiver.
    pub fn new() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish an event.
    pub fn publish(&self, event: BatchEvent) {
        if self.tx.send(event).is_err() {
            trace!("Event receiver dropped, discarding event");
        }
    }

    /// Whether anyone is still listening.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn item_started(&self, index: usize, total: usize, filename: impl Into<String>) {
        self.publish(BatchEvent::ItemStarted {
            index,
            total,
            filename: filename.into(),
        });
    }

    pub fn item_finished(
        &self,
        index: usize,
        total: usize,
        filename: impl Into<String>,
        outcome: JobOutcome,
        detail: Option<String>,
    ) {
        self.publish(BatchEvent::ItemFinished {
            index,
            total,
            filename: filename.into(),
            outcome,
            detail,
        });
    }

    pub fn status_changed(&self, path: &Path, status: ItemStatus) {
        self.publish(BatchEvent::status_changed(path, status));
    }

    pub fn encode_progress(&self, index: usize, percent: u8) {
        self.publish(BatchEvent::EncodeProgress { index, percent });
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.publish(BatchEvent::log(level, message));
    }

    pub fn finished(&self, summary: BatchSummary) {
        self.publish(BatchEvent::Finished(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcomp_models::ColorHint;

    #[test]
    fn test_events_arrive_in_order() {
        let (channel, mut rx) = ProgressChannel::new();
        channel.item_started(0, 2, "a.mp4");
        channel.status_changed(Path::new("/v/a.mp4"), ItemStatus::Processing);
        channel.finished(BatchSummary::new(2));

        assert!(matches!(
            rx.try_recv().unwrap(),
            BatchEvent::ItemStarted { index: 0, total: 2, .. }
        ));
        match rx.try_recv().unwrap() {
            BatchEvent::StatusChanged { status, color_hint, .. } => {
                assert_eq!(status, ItemStatus::Processing);
                assert_eq!(color_hint, ColorHint::Accent);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().unwrap().is_terminal());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (channel, rx) = ProgressChannel::new();
        drop(rx);
        assert!(!channel.is_connected());
        channel.log(LogLevel::Info, "nobody listening");
        channel.finished(BatchSummary::new(0));
    }

    #[test]
    fn test_clones_share_stream() {
        let (channel, mut rx) = ProgressChannel::new();
        let worker_side = channel.clone();
        worker_side.encode_progress(1, 42);
        assert_eq!(
            tokio_test::block_on(rx.recv()),
            Some(BatchEvent::EncodeProgress { index: 1, percent: 42 })
        );
    }
}
