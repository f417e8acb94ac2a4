//! Configuration for the index maintainer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happens to the children of a deleted entity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeletionPolicy {
    /// Direct children become roots.
    #[default]
    PromoteChildren,
    /// The whole subtree is removed from every index.
    ///
    /// Use with stores that announce only the deleted root, such as
    /// `SceneStore::despawn_subtree`. Paired with `SceneStore::despawn`,
    /// which keeps the children alive, it would drop live entities.
    Cascade,
}

/// How events are handled between `begin_bulk_load` and `end_bulk_load`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BulkLoadStrategy {
    /// Keep applying events; park those that race ahead of entity creation.
    #[default]
    Buffer,
    /// Ignore events during the load and rebuild once when it ends.
    TerminalRebuild,
}

/// Configuration for [`IndexMaintainer`](crate::IndexMaintainer).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaintainerConfig {
    /// Policy applied on entity deletion.
    pub deletion_policy: DeletionPolicy,

    /// Bulk-load handling.
    pub bulk_load: BulkLoadStrategy,

    /// Bound on ancestor walks (cycle checks and depth queries).
    pub max_hierarchy_depth: usize,

    /// Parked events beyond this count are dropped and the index is flagged stale.
    pub max_deferred_events: usize,
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        Self {
            deletion_policy: DeletionPolicy::PromoteChildren,
            bulk_load: BulkLoadStrategy::Buffer,
            max_hierarchy_depth: 4096,
            max_deferred_events: 65_536,
        }
    }
}

impl MaintainerConfig {
    /// Creates a configuration that rebuilds after bulk loads instead of
    /// buffering, with a small parking bound.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            bulk_load: BulkLoadStrategy::TerminalRebuild,
            max_deferred_events: 1024,
            ..Self::default()
        }
    }

    /// Builder method to set the deletion policy.
    #[must_use]
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    /// Builder method to set the bulk-load strategy.
    #[must_use]
    pub fn with_bulk_load(mut self, strategy: BulkLoadStrategy) -> Self {
        self.bulk_load = strategy;
        self
    }

    /// Builder method to set the hierarchy depth bound.
    #[must_use]
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// Builder method to set the parked event bound.
    #[must_use]
    pub fn with_max_deferred_events(mut self, count: usize) -> Self {
        self.max_deferred_events = count;
        self
    }
}
