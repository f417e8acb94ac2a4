//! Read interface of the authoritative store used for probing and rebuilds.

use scenedex_foundation::{ComponentType, EntityId};

/// One live entity as the authoritative store sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntity {
    /// The entity.
    pub id: EntityId,
    /// Its parent, if any.
    pub parent: Option<EntityId>,
    /// Its children, in sibling order.
    pub children: Vec<EntityId>,
    /// Component types currently attached.
    pub components: Vec<ComponentType>,
}

/// The authoritative entity/component store, seen from the index layer.
///
/// `live_entity_count` is the cheap probe and must be O(1). The other methods
/// drain the whole store and are only called on the recovery path.
pub trait SceneSource {
    /// Returns the number of live entities.
    fn live_entity_count(&self) -> usize;

    /// Returns every live entity in creation order.
    fn entities(&self) -> Vec<SourceEntity>;

    /// Returns every registered component type.
    fn component_types(&self) -> Vec<ComponentType>;
}
