use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use revtrail_types::{CommitRecord, EntitySnapshot, Revision};

use crate::error::{SourceError, SourceResult};

/// Where commit history and full snapshots come from.
///
/// Implementations wrap the remote layer that serves version data. Both
/// methods may be called concurrently.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Commit records for revisions `2..=N`, in order.
    async fn fetch_history(&self) -> SourceResult<Vec<CommitRecord>>;
    /// The full entity snapshot of one revision.
    async fn fetch_snapshot(&self, revision: Revision) -> SourceResult<EntitySnapshot>;
}

/// A source backed by in-memory data.
#[derive(Debug, Default)]
pub struct InMemorySource {
    history: Vec<CommitRecord>,
    snapshots: HashMap<Revision, EntitySnapshot>,
    history_fetches: AtomicUsize,
    snapshot_fetches: AtomicUsize,
}

impl InMemorySource {
    pub fn new(history: Vec<CommitRecord>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Register the snapshot served for `revision`.
    pub fn with_snapshot(mut self, revision: Revision, snapshot: EntitySnapshot) -> Self {
        self.snapshots.insert(revision, snapshot);
        self
    }

    /// How many times the history was fetched.
    pub fn history_fetches(&self) -> usize {
        self.history_fetches.load(Ordering::Relaxed)
    }

    /// How many snapshot fetches were served or refused.
    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SnapshotSource for InMemorySource {
    async fn fetch_history(&self) -> SourceResult<Vec<CommitRecord>> {
        self.history_fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.history.clone())
    }

    async fn fetch_snapshot(&self, revision: Revision) -> SourceResult<EntitySnapshot> {
        self.snapshot_fetches.fetch_add(1, Ordering::Relaxed);
        self.snapshots
            .get(&revision)
            .cloned()
            .ok_or(SourceError::SnapshotNotFound(revision))
    }
}
