//! Read surface over the indices.
//!
//! [`IndexView`] answers structural queries from a borrowed [`Indices`]. It
//! never fails and never scans: unknown ids produce empty results.
//! [`QueryFacade`] is what consumers hold; it pairs a view of the
//! maintainer's current indices with the recovery trigger.

use scenedex_foundation::{ComponentType, EntityId};
use scenedex_storage::SceneSource;

use crate::indices::Indices;
use crate::maintainer::{IndexMaintainer, RebuildReport};

// =============================================================================
// IndexView
// =============================================================================

/// Borrowed, read-only view of a set of indices.
#[derive(Copy, Clone, Debug)]
pub struct IndexView<'a> {
    indices: &'a Indices,
}

impl<'a> IndexView<'a> {
    /// Creates a view over `indices`.
    #[must_use]
    pub fn new(indices: &'a Indices) -> Self {
        Self { indices }
    }

    /// Returns the indices behind this view.
    #[must_use]
    pub fn indices(&self) -> &'a Indices {
        self.indices
    }

    /// Returns every live entity, in creation order.
    #[must_use]
    pub fn list_all_entities(&self) -> Vec<EntityId> {
        self.indices.entities.to_vec()
    }

    /// Returns the entities carrying `component`.
    #[must_use]
    pub fn list_entities_with_component(&self, component: ComponentType) -> Vec<EntityId> {
        self.indices.components.entities_with(component)
    }

    /// Returns the entities carrying any of `components`, without duplicates.
    #[must_use]
    pub fn list_entities_with_any_component(&self, components: &[ComponentType]) -> Vec<EntityId> {
        self.indices.components.entities_with_any(components)
    }

    /// Returns the entities carrying all of `components`.
    #[must_use]
    pub fn list_entities_with_all_components(&self, components: &[ComponentType]) -> Vec<EntityId> {
        self.indices.components.entities_with_all(components)
    }

    /// Returns the children of `id` in sibling order.
    #[must_use]
    pub fn get_children(&self, id: EntityId) -> Vec<EntityId> {
        self.indices.hierarchy.get_children(id)
    }

    /// Returns the parent of `id`.
    #[must_use]
    pub fn get_parent(&self, id: EntityId) -> Option<EntityId> {
        self.indices.hierarchy.parent_of(id)
    }

    /// Returns the entities without a parent.
    #[must_use]
    pub fn get_root_entities(&self) -> Vec<EntityId> {
        self.indices.hierarchy.get_root_entities()
    }

    /// Returns the number of ancestors of `id`.
    #[must_use]
    pub fn get_depth(&self, id: EntityId) -> usize {
        self.indices.hierarchy.get_depth(id)
    }

    /// Returns the number of entities carrying `component`.
    #[must_use]
    pub fn get_component_count(&self, component: ComponentType) -> usize {
        self.indices.components.count(component)
    }

    /// Returns every component type the index has seen.
    #[must_use]
    pub fn get_component_types(&self) -> Vec<ComponentType> {
        self.indices.components.component_types()
    }

    /// Checks if `id` is live.
    #[must_use]
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.indices.entities.contains(id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.indices.entities.len()
    }
}

// =============================================================================
// QueryFacade
// =============================================================================

/// The query entry point, obtained from [`IndexMaintainer::facade`].
///
/// Queries read only the indices. The store is touched only by
/// [`rebuild_indices`](Self::rebuild_indices) and
/// [`recover_if_stale`](Self::recover_if_stale).
pub struct QueryFacade<'a> {
    maintainer: &'a mut IndexMaintainer,
    source: &'a dyn SceneSource,
}

impl<'a> QueryFacade<'a> {
    pub(crate) fn new(maintainer: &'a mut IndexMaintainer, source: &'a dyn SceneSource) -> Self {
        Self { maintainer, source }
    }

    /// Returns a view of the current indices.
    #[must_use]
    pub fn view(&self) -> IndexView<'_> {
        self.maintainer.view()
    }

    /// Returns every live entity, in creation order.
    #[must_use]
    pub fn list_all_entities(&self) -> Vec<EntityId> {
        self.view().list_all_entities()
    }

    /// Returns the entities carrying `component`.
    #[must_use]
    pub fn list_entities_with_component(&self, component: ComponentType) -> Vec<EntityId> {
        self.view().list_entities_with_component(component)
    }

    /// Returns the entities carrying any of `components`, without duplicates.
    #[must_use]
    pub fn list_entities_with_any_component(&self, components: &[ComponentType]) -> Vec<EntityId> {
        self.view().list_entities_with_any_component(components)
    }

    /// Returns the entities carrying all of `components`.
    #[must_use]
    pub fn list_entities_with_all_components(&self, components: &[ComponentType]) -> Vec<EntityId> {
        self.view().list_entities_with_all_components(components)
    }

    /// Returns the children of `id` in sibling order.
    #[must_use]
    pub fn get_children(&self, id: EntityId) -> Vec<EntityId> {
        self.view().get_children(id)
    }

    /// Returns the parent of `id`.
    #[must_use]
    pub fn get_parent(&self, id: EntityId) -> Option<EntityId> {
        self.view().get_parent(id)
    }

    /// Returns the entities without a parent.
    #[must_use]
    pub fn get_root_entities(&self) -> Vec<EntityId> {
        self.view().get_root_entities()
    }

    /// Returns the number of ancestors of `id`.
    #[must_use]
    pub fn get_depth(&self, id: EntityId) -> usize {
        self.view().get_depth(id)
    }

    /// Returns the number of entities carrying `component`.
    #[must_use]
    pub fn get_component_count(&self, component: ComponentType) -> usize {
        self.view().get_component_count(component)
    }

    /// Returns every component type the index has seen.
    #[must_use]
    pub fn get_component_types(&self) -> Vec<ComponentType> {
        self.view().get_component_types()
    }

    /// Checks if `id` is live.
    #[must_use]
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.view().entity_exists(id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.view().entity_count()
    }

    /// Rebuilds every index from the store. Safe to call redundantly.
    pub fn rebuild_indices(&mut self) -> RebuildReport {
        self.maintainer.rebuild(self.source)
    }

    /// Rebuilds once if the indices disagree with the store's live count.
    pub fn recover_if_stale(&mut self) -> Option<RebuildReport> {
        self.maintainer.recover_if_stale(self.source)
    }
}
