//! The set of live entities.

use scenedex_foundation::{EntityId, OrderedSet};

/// Live entity set with insertion-order iteration.
///
/// Membership means the authoritative store still has the entity; absence
/// means it is dead or never existed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityIndex {
    live: OrderedSet<EntityId>,
}

impl EntityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an entity live. Inserting a live entity is a no-op.
    pub fn insert(&mut self, id: EntityId) -> bool {
        self.live.insert(id)
    }

    /// Marks an entity dead. Removing an absent entity is a no-op.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.live.remove(&id)
    }

    /// Checks if an entity is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterates over live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    /// Copies the live entities out in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.live.to_vec()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.live.clear();
    }
}
