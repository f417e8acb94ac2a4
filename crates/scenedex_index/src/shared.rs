//! Snapshot handoff from the writer thread to reader threads.
//!
//! The maintainer stays single-threaded. After draining, the writer
//! publishes an immutable snapshot; readers on other threads grab the
//! latest one and query it without holding any lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::indices::Indices;
use crate::maintainer::IndexMaintainer;
use crate::query::IndexView;

/// Immutable copy of the indices at one point in time.
#[derive(Clone, Debug)]
pub struct IndexSnapshot {
    indices: Indices,
    version: u64,
}

impl IndexSnapshot {
    pub(crate) fn new(indices: Indices, version: u64) -> Self {
        Self { indices, version }
    }

    /// Returns the maintainer version this snapshot was taken at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns a query view over the snapshot.
    #[must_use]
    pub fn view(&self) -> IndexView<'_> {
        IndexView::new(&self.indices)
    }

    /// Returns the captured indices.
    #[must_use]
    pub fn indices(&self) -> &Indices {
        &self.indices
    }
}

type Slot = Arc<RwLock<Arc<IndexSnapshot>>>;

/// Writer side of the handoff.
#[derive(Debug)]
pub struct IndexPublisher {
    slot: Slot,
}

impl Default for IndexPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexPublisher {
    /// Creates a publisher holding an empty version 0 snapshot.
    #[must_use]
    pub fn new() -> Self {
        let empty = IndexSnapshot::new(Indices::default(), 0);
        Self {
            slot: Arc::new(RwLock::new(Arc::new(empty))),
        }
    }

    /// Drains `maintainer` and publishes its state. Returns the new version.
    pub fn publish(&self, maintainer: &mut IndexMaintainer) -> u64 {
        let snapshot = Arc::new(maintainer.snapshot());
        let version = snapshot.version();
        *self.slot.write() = snapshot;
        version
    }

    /// Returns a new reader handle.
    #[must_use]
    pub fn reader(&self) -> IndexReader {
        IndexReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Reader side of the handoff. Cheap to clone and send to other threads.
#[derive(Clone, Debug)]
pub struct IndexReader {
    slot: Slot,
}

impl IndexReader {
    /// Returns the latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&*self.slot.read())
    }

    /// Returns the latest published version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.read().version()
    }
}
