//! Ordered compression queue.

use std::path::{Path, PathBuf};
use tracing::debug;

use vcomp_models::{ItemStatus, QueueItem};

use crate::error::{QueueError, QueueResult};

/// Videos waiting for (or done with) compression, in insertion order.
///
/// A path appears at most once.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    items: Vec<QueueItem>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from paths, silently skipping duplicates.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut queue = Self::new();
        queue.add_paths(paths);
        queue
    }

    /// Append an item. Fails if its path is already queued.
    pub fn push(&mut self, item: QueueItem) -> QueueResult<()> {
        if self.contains(&item.path) {
            return Err(QueueError::Duplicate(item.path));
        }
        debug!(path = %item.path.display(), "Queued video");
        self.items.push(item);
        Ok(())
    }

    /// Append a path as a pending item.
    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> QueueResult<()> {
        let path = path.into();
        if self.contains(&path) {
            return Err(QueueError::Duplicate(path));
        }
        self.push(QueueItem::new(path))
    }

    /// Append paths, treating duplicates as no-ops. Returns how many were added.
    pub fn add_paths<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|p| self.add_path(p))
            .filter(Result::is_ok)
            .count()
    }

    /// Remove the item with `path`.
    pub fn remove(&mut self, path: &Path) -> QueueResult<QueueItem> {
        let index = self
            .position(path)
            .ok_or_else(|| QueueError::NotFound(path.to_path_buf()))?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Put every item back to `Pending` ("start over").
    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.status = ItemStatus::Pending;
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.items.iter().position(|item| item.path == path)
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut QueueItem> {
        self.items.get_mut(index)
    }

    /// Set the status of the item at `index`. Returns the previous status.
    pub fn set_status(&mut self, index: usize, status: ItemStatus) -> Option<ItemStatus> {
        self.items
            .get_mut(index)
            .map(|item| std::mem::replace(&mut item.status, status))
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first item that is not `Done`.
    pub fn first_resumable_index(&self) -> Option<usize> {
        self.items.iter().position(|item| !item.is_done())
    }

    /// Number of items in `status`.
    pub fn count_with_status(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(names: &[&str]) -> JobQueue {
        let mut queue = JobQueue::new();
        for name in names {
            queue
                .push(QueueItem::with_size(format!("/v/{}", name), Some(4096)))
                .unwrap();
        }
        queue
    }

    #[test]
    fn test_duplicate_rejected_and_length_unchanged() {
        let mut queue = queue_of(&["a.mp4", "b.mp4"]);
        let err = queue
            .push(QueueItem::with_size("/v/a.mp4", None))
            .unwrap_err();
        assert_eq!(err, QueueError::Duplicate(PathBuf::from("/v/a.mp4")));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_add_paths_counts_new_only() {
        let mut queue = JobQueue::new();
        let added = queue.add_paths(["/v/a.mp4", "/v/b.mp4", "/v/a.mp4"]);
        assert_eq!(added, 2);
        assert_eq!(queue.add_paths(["/v/b.mp4"]), 0);
        assert_eq!(queue.len(), 2);

        let order: Vec<_> = queue.iter().map(|i| i.path.clone()).collect();
        assert_eq!(order, vec![PathBuf::from("/v/a.mp4"), PathBuf::from("/v/b.mp4")]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut queue = queue_of(&["a.mp4", "b.mp4", "c.mp4"]);
        let removed = queue.remove(Path::new("/v/b.mp4")).unwrap();
        assert_eq!(removed.file_name(), "b.mp4");
        assert_eq!(queue.len(), 2);
        assert!(matches!(
            queue.remove(Path::new("/v/b.mp4")),
            Err(QueueError::NotFound(_))
        ));

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.first_resumable_index(), None);
    }

    #[test]
    fn test_resume_index_and_reset() {
        let mut queue = queue_of(&["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(queue.set_status(0, ItemStatus::Done), Some(ItemStatus::Pending));
        queue.set_status(1, ItemStatus::Error);
        assert_eq!(queue.first_resumable_index(), Some(1));
        assert_eq!(queue.count_with_status(ItemStatus::Done), 1);

        queue.reset_all();
        assert_eq!(queue.count_with_status(ItemStatus::Pending), 3);
        assert_eq!(queue.first_resumable_index(), Some(0));
    }

    #[test]
    fn test_set_status_out_of_range() {
        let mut queue = JobQueue::new();
        assert_eq!(queue.set_status(3, ItemStatus::Done), None);
    }
}
