//! Component type membership.
//!
//! Forward: component type -> entities carrying it.
//! Reverse: entity -> component types it carries, so evicting an entity
//! touches only the sets it is actually in.

use std::collections::HashSet;

use scenedex_foundation::{ComponentType, EntityId, OrderedSet};

/// Component type to entity membership table.
///
/// An entity is in a type's set iff the authoritative store has that
/// component attached to it. Types stay registered once seen, even when
/// their set empties, until [`clear`](Self::clear).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentIndex {
    /// Types in registration order.
    types: OrderedSet<ComponentType>,
    /// type -> entities in attach order.
    members: im::HashMap<ComponentType, OrderedSet<EntityId>>,
    /// entity -> types in attach order.
    by_entity: im::HashMap<EntityId, OrderedSet<ComponentType>>,
}

impl ComponentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component type with an empty member set.
    pub fn register_type(&mut self, component: ComponentType) -> bool {
        if !self.types.insert(component) {
            return false;
        }
        self.members.insert(component, OrderedSet::new());
        true
    }

    /// Records that `entity` gained `component`. Repeated adds are no-ops.
    pub fn on_add(&mut self, component: ComponentType, entity: EntityId) -> bool {
        self.register_type(component);
        let added = self
            .members
            .entry(component)
            .or_insert_with(OrderedSet::new)
            .insert(entity);
        if added {
            self.by_entity
                .entry(entity)
                .or_insert_with(OrderedSet::new)
                .insert(component);
        }
        added
    }

    /// Records that `entity` lost `component`. Absent memberships are no-ops.
    pub fn on_remove(&mut self, component: ComponentType, entity: EntityId) -> bool {
        let removed = self
            .members
            .get_mut(&component)
            .is_some_and(|set| set.remove(&entity));
        if removed {
            let now_empty = match self.by_entity.get_mut(&entity) {
                Some(types) => {
                    types.remove(&component);
                    types.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_entity.remove(&entity);
            }
        }
        removed
    }

    /// Evicts an entity from every type's set at once.
    ///
    /// Returns the types it was removed from.
    pub fn remove_entity_everywhere(&mut self, entity: EntityId) -> Vec<ComponentType> {
        let Some(types) = self.by_entity.remove(&entity) else {
            return Vec::new();
        };
        for component in types.iter() {
            if let Some(set) = self.members.get_mut(component) {
                set.remove(&entity);
            }
        }
        types.to_vec()
    }

    /// Returns the entities carrying a component, in attach order.
    #[must_use]
    pub fn entities_with(&self, component: ComponentType) -> Vec<EntityId> {
        self.members
            .get(&component)
            .map(OrderedSet::to_vec)
            .unwrap_or_default()
    }

    /// Returns entities carrying any of the given components.
    ///
    /// Each entity appears once, at the position of its first match.
    #[must_use]
    pub fn entities_with_any(&self, components: &[ComponentType]) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for component in components {
            if let Some(set) = self.members.get(component) {
                for entity in set.iter() {
                    if seen.insert(*entity) {
                        out.push(*entity);
                    }
                }
            }
        }
        out
    }

    /// Returns entities carrying every one of the given components.
    ///
    /// Iterates the smallest set and probes the others. An empty type list
    /// matches nothing.
    #[must_use]
    pub fn entities_with_all(&self, components: &[ComponentType]) -> Vec<EntityId> {
        let mut sets = Vec::with_capacity(components.len());
        for component in components {
            match self.members.get(component) {
                Some(set) => sets.push(set),
                None => return Vec::new(),
            }
        }
        let Some((smallest, rest)) = sets
            .iter()
            .enumerate()
            .min_by_key(|(_, set)| set.len())
            .map(|(i, set)| (*set, i))
        else {
            return Vec::new();
        };

        smallest
            .iter()
            .filter(|entity| {
                sets.iter()
                    .enumerate()
                    .all(|(i, set)| i == rest || set.contains(entity))
            })
            .copied()
            .collect()
    }

    /// Checks a single membership.
    #[must_use]
    pub fn has(&self, entity: EntityId, component: ComponentType) -> bool {
        self.members
            .get(&component)
            .is_some_and(|set| set.contains(&entity))
    }

    /// Returns the number of entities carrying a component.
    #[must_use]
    pub fn count(&self, component: ComponentType) -> usize {
        self.members.get(&component).map_or(0, OrderedSet::len)
    }

    /// Returns the component types an entity carries, in attach order.
    #[must_use]
    pub fn types_of(&self, entity: EntityId) -> Vec<ComponentType> {
        self.by_entity
            .get(&entity)
            .map(OrderedSet::to_vec)
            .unwrap_or_default()
    }

    /// Returns every registered component type.
    #[must_use]
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.types.to_vec()
    }

    /// Returns the number of entities that carry at least one component.
    #[must_use]
    pub fn tracked_entities(&self) -> usize {
        self.by_entity.len()
    }

    /// Removes every membership. Registered types stay listed.
    pub fn clear_memberships(&mut self) {
        self.members = self
            .types
            .iter()
            .map(|component| (*component, OrderedSet::new()))
            .collect();
        self.by_entity = im::HashMap::new();
    }

    /// Removes every type and membership.
    pub fn clear(&mut self) {
        self.types.clear();
        self.members = im::HashMap::new();
        self.by_entity = im::HashMap::new();
    }
}
