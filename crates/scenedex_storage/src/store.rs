//! Reference authoritative store.
//!
//! `SceneStore` owns entity liveness, component attachment, and parent links,
//! and announces every mutation on its [`ChangeBus`]. It stands in for the
//! engine's component tables: it tracks which components are attached but not
//! their payloads.

use std::collections::HashMap;

use log::{debug, trace};

use scenedex_foundation::{
    ComponentRegistry, ComponentType, EntityId, Error, ErrorKind, OrderedSet, Result,
};

use crate::bus::ChangeBus;
use crate::event::ChangeEvent;
use crate::source::{SceneSource, SourceEntity};

/// Per-entity bookkeeping.
#[derive(Clone, Debug, Default)]
struct EntityRecord {
    parent: Option<EntityId>,
    children: OrderedSet<EntityId>,
    /// Attached component types, sorted by index.
    components: Vec<ComponentType>,
}

impl EntityRecord {
    fn has(&self, component: ComponentType) -> bool {
        self.components.binary_search(&component).is_ok()
    }
}

/// Authoritative entity/component/hierarchy store.
///
/// Ids are allocated densely from zero and never reused until [`clear`]
/// resets allocation.
///
/// [`clear`]: SceneStore::clear
#[derive(Debug)]
pub struct SceneStore {
    bus: ChangeBus,
    registry: ComponentRegistry,
    /// Live entities in creation order.
    live: OrderedSet<EntityId>,
    records: HashMap<EntityId, EntityRecord>,
    next_index: u64,
    /// When set, mutations are applied without being announced.
    muted: bool,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(ChangeBus::new())
    }
}

impl SceneStore {
    /// Creates an empty store that announces mutations on `bus`.
    #[must_use]
    pub fn new(bus: ChangeBus) -> Self {
        Self {
            bus,
            registry: ComponentRegistry::new(),
            live: OrderedSet::new(),
            records: HashMap::new(),
            next_index: 0,
            muted: false,
        }
    }

    /// Returns the bus this store announces on.
    #[must_use]
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Returns the component type registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Stops or resumes announcing mutations.
    ///
    /// Models loaders that write straight into storage and bypass the
    /// notification channel; indices fed by this store go stale while muted.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Returns true while mutations are not announced.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn announce(&self, event: &ChangeEvent) {
        if self.muted {
            trace!("muted, not announcing {}", event.kind());
            return;
        }
        self.bus.emit(event);
    }

    // =========================================================================
    // Component Types
    // =========================================================================

    /// Registers a component type by name, returning its token.
    ///
    /// Registering an existing name returns the existing token and announces
    /// nothing.
    pub fn register_component_type(&mut self, name: &str) -> ComponentType {
        if let Some(existing) = self.registry.lookup(name) {
            return existing;
        }
        let component = self.registry.register(name);
        self.announce(&ChangeEvent::ComponentTypeRegistered { component });
        component
    }

    /// Resolves a registered component type name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name was never registered.
    pub fn component_type(&self, name: &str) -> Result<ComponentType> {
        self.registry.resolve(name)
    }

    fn validate_component(&self, component: ComponentType) -> Result<()> {
        if self.registry.name(component).is_none() {
            return Err(Error::new(ErrorKind::UnknownComponentType(format!(
                "{component:?}"
            ))));
        }
        Ok(())
    }

    // =========================================================================
    // Entity Lifecycle
    // =========================================================================

    fn validate(&self, id: EntityId) -> Result<()> {
        if self.records.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::unknown_entity(id))
        }
    }

    /// Creates an entity, optionally under a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not live.
    pub fn spawn(&mut self, parent: Option<EntityId>) -> Result<EntityId> {
        if let Some(p) = parent {
            self.validate(p)?;
        }

        let id = EntityId::new(self.next_index);
        self.next_index += 1;

        self.live.insert(id);
        self.records.insert(
            id,
            EntityRecord {
                parent,
                ..EntityRecord::default()
            },
        );
        if let Some(p) = parent {
            if let Some(record) = self.records.get_mut(&p) {
                record.children.insert(id);
            }
        }

        self.announce(&ChangeEvent::EntityCreated { id, parent });
        Ok(id)
    }

    /// Destroys an entity, promoting its children to roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let record = self
            .records
            .remove(&id)
            .ok_or_else(|| Error::unknown_entity(id))?;

        for child in record.children.iter() {
            if let Some(child_record) = self.records.get_mut(child) {
                child_record.parent = None;
            }
        }
        if let Some(p) = record.parent {
            if let Some(parent_record) = self.records.get_mut(&p) {
                parent_record.children.remove(&id);
            }
        }
        self.live.remove(&id);

        self.announce(&ChangeEvent::EntityDeleted { id });
        Ok(())
    }

    /// Destroys an entity and its whole subtree.
    ///
    /// Deletions are announced leaves first, so a subscriber never sees a
    /// parent disappear while it still has children. Returns the destroyed
    /// ids in announcement order.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn despawn_recursive(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        self.validate(id)?;
        let order = self.subtree_post_order(id);
        for victim in &order {
            self.despawn(*victim)?;
        }
        debug!("despawned {} entities under {id}", order.len());
        Ok(order)
    }

    /// Destroys an entity and its whole subtree, announcing only the root.
    ///
    /// Pairs with subscribers that cascade deletions themselves. A subscriber
    /// that promotes children instead would keep the descendants alive.
    /// Returns the destroyed ids, children before their parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn despawn_subtree(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        self.validate(id)?;
        let order = self.subtree_post_order(id);

        if let Some(p) = self.records.get(&id).and_then(|r| r.parent) {
            if let Some(parent_record) = self.records.get_mut(&p) {
                parent_record.children.remove(&id);
            }
        }
        for victim in &order {
            self.records.remove(victim);
            self.live.remove(victim);
        }
        debug!("despawned subtree of {} entities under {id}", order.len());

        self.announce(&ChangeEvent::EntityDeleted { id });
        Ok(order)
    }

    /// Collects `id` and its descendants, children before their parent.
    fn subtree_post_order(&self, id: EntityId) -> Vec<EntityId> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(record) = self.records.get(&current) {
                let children = record.children.to_vec();
                stack.extend(children.into_iter().rev().map(|child| (child, false)));
            }
        }
        order
    }

    /// Destroys every entity and restarts id allocation at zero.
    ///
    /// Registered component types survive.
    pub fn clear(&mut self) {
        debug!("clearing {} entities", self.live.len());
        self.live.clear();
        self.records.clear();
        self.next_index = 0;
        self.announce(&ChangeEvent::EntitiesCleared);
    }

    /// Checks if an entity is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterates over live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component to an entity.
    ///
    /// Attaching an already attached component is a no-op and announces
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live or the type is unknown.
    pub fn attach(&mut self, entity: EntityId, component: ComponentType) -> Result<()> {
        self.validate_component(component)?;
        let record = self
            .records
            .get_mut(&entity)
            .ok_or_else(|| Error::unknown_entity(entity))?;

        match record.components.binary_search(&component) {
            Ok(_) => return Ok(()),
            Err(pos) => record.components.insert(pos, component),
        }

        self.announce(&ChangeEvent::ComponentAdded { entity, component });
        Ok(())
    }

    /// Detaches a component from an entity.
    ///
    /// Detaching an absent component is a no-op and announces nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn detach(&mut self, entity: EntityId, component: ComponentType) -> Result<()> {
        let record = self
            .records
            .get_mut(&entity)
            .ok_or_else(|| Error::unknown_entity(entity))?;

        match record.components.binary_search(&component) {
            Ok(pos) => {
                record.components.remove(pos);
            }
            Err(_) => return Ok(()),
        }

        self.announce(&ChangeEvent::ComponentRemoved { entity, component });
        Ok(())
    }

    /// Checks if an entity has a component attached.
    #[must_use]
    pub fn has_component(&self, entity: EntityId, component: ComponentType) -> bool {
        self.records.get(&entity).is_some_and(|r| r.has(component))
    }

    /// Returns the components attached to an entity, sorted by token.
    #[must_use]
    pub fn components_of(&self, entity: EntityId) -> &[ComponentType] {
        self.records
            .get(&entity)
            .map_or(&[], |r| r.components.as_slice())
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Moves an entity under a new parent, or to the root with `None`.
    ///
    /// Setting the current parent again is a no-op and announces nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is not live, or if the new parent is
    /// the entity itself or one of its descendants.
    pub fn set_parent(&mut self, id: EntityId, parent: Option<EntityId>) -> Result<()> {
        self.validate(id)?;
        if let Some(p) = parent {
            self.validate(p)?;
            let mut cursor = Some(p);
            while let Some(ancestor) = cursor {
                if ancestor == id {
                    return Err(Error::cycle_detected(id, p));
                }
                cursor = self.records.get(&ancestor).and_then(|r| r.parent);
            }
        }

        let old = self.records.get(&id).and_then(|r| r.parent);
        if old == parent {
            return Ok(());
        }

        if let Some(old_parent) = old {
            if let Some(record) = self.records.get_mut(&old_parent) {
                record.children.remove(&id);
            }
        }
        if let Some(new_parent) = parent {
            if let Some(record) = self.records.get_mut(&new_parent) {
                record.children.insert(id);
            }
        }
        if let Some(record) = self.records.get_mut(&id) {
            record.parent = parent;
        }

        self.announce(&ChangeEvent::ParentChanged {
            id,
            new_parent: parent,
        });
        Ok(())
    }

    /// Returns the parent of an entity.
    #[must_use]
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.records.get(&id).and_then(|r| r.parent)
    }

    /// Returns the children of an entity in sibling order.
    #[must_use]
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.records
            .get(&id)
            .map(|r| r.children.to_vec())
            .unwrap_or_default()
    }
}

impl SceneSource for SceneStore {
    fn live_entity_count(&self) -> usize {
        self.live.len()
    }

    fn entities(&self) -> Vec<SourceEntity> {
        self.live
            .iter()
            .filter_map(|id| {
                self.records.get(id).map(|record| SourceEntity {
                    id: *id,
                    parent: record.parent,
                    children: record.children.to_vec(),
                    components: record.components.clone(),
                })
            })
            .collect()
    }

    fn component_types(&self) -> Vec<ComponentType> {
        self.registry.types().collect()
    }
}
