//! Mutation notifications emitted by the storage layer.

use std::fmt;
use std::str::FromStr;

use scenedex_foundation::{ComponentType, EntityId, Error, ErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single mutation of the authoritative store.
///
/// Payloads are kept minimal: identifiers only, never component data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeEvent {
    /// An entity was created, optionally under a parent.
    EntityCreated {
        /// The new entity.
        id: EntityId,
        /// Initial parent, if any.
        parent: Option<EntityId>,
    },
    /// An entity was destroyed.
    EntityDeleted {
        /// The destroyed entity.
        id: EntityId,
    },
    /// Every entity was destroyed at once.
    EntitiesCleared,
    /// A component was attached to an entity.
    ComponentAdded {
        /// The entity that gained the component.
        entity: EntityId,
        /// The attached component type.
        component: ComponentType,
    },
    /// A component was detached from an entity.
    ComponentRemoved {
        /// The entity that lost the component.
        entity: EntityId,
        /// The detached component type.
        component: ComponentType,
    },
    /// An entity was moved under a new parent (or made a root).
    ParentChanged {
        /// The reparented entity.
        id: EntityId,
        /// The new parent, or `None` for root.
        new_parent: Option<EntityId>,
    },
    /// A component type was registered with the store.
    ComponentTypeRegistered {
        /// The new component type.
        component: ComponentType,
    },
}

impl ChangeEvent {
    /// Returns the kind tag of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::EntityCreated { .. } => EventKind::EntityCreated,
            Self::EntityDeleted { .. } => EventKind::EntityDeleted,
            Self::EntitiesCleared => EventKind::EntitiesCleared,
            Self::ComponentAdded { .. } => EventKind::ComponentAdded,
            Self::ComponentRemoved { .. } => EventKind::ComponentRemoved,
            Self::ParentChanged { .. } => EventKind::ParentChanged,
            Self::ComponentTypeRegistered { .. } => EventKind::ComponentTypeRegistered,
        }
    }

    /// Returns the entity the event is about, if any.
    #[must_use]
    pub fn subject(&self) -> Option<EntityId> {
        match self {
            Self::EntityCreated { id, .. }
            | Self::EntityDeleted { id }
            | Self::ParentChanged { id, .. } => Some(*id),
            Self::ComponentAdded { entity, .. } | Self::ComponentRemoved { entity, .. } => {
                Some(*entity)
            }
            Self::EntitiesCleared | Self::ComponentTypeRegistered { .. } => None,
        }
    }
}

/// Event name tags used for subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    /// `entity-created`
    EntityCreated,
    /// `entity-deleted`
    EntityDeleted,
    /// `entities-cleared`
    EntitiesCleared,
    /// `component:added`
    ComponentAdded,
    /// `component:removed`
    ComponentRemoved,
    /// `parent-changed`
    ParentChanged,
    /// `component-type:registered`
    ComponentTypeRegistered,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 7] = [
        EventKind::EntityCreated,
        EventKind::EntityDeleted,
        EventKind::EntitiesCleared,
        EventKind::ComponentAdded,
        EventKind::ComponentRemoved,
        EventKind::ParentChanged,
        EventKind::ComponentTypeRegistered,
    ];

    /// Returns the wire name of this event kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EntityCreated => "entity-created",
            Self::EntityDeleted => "entity-deleted",
            Self::EntitiesCleared => "entities-cleared",
            Self::ComponentAdded => "component:added",
            Self::ComponentRemoved => "component:removed",
            Self::ParentChanged => "parent-changed",
            Self::ComponentTypeRegistered => "component-type:registered",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("unknown event name: {s}"))))
    }
}
