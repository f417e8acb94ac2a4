//! Error types for scenedex.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use thiserror::Error;

use crate::entity::EntityId;

/// Result alias used across scenedex crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for scenedex operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional note about what was being done when the error occurred.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates a cycle detected error.
    #[must_use]
    pub fn cycle_detected(child: EntityId, parent: EntityId) -> Self {
        Self::new(ErrorKind::CycleDetected { child, parent })
    }

    /// Creates an unknown entity error.
    #[must_use]
    pub fn unknown_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::UnknownEntity(id))
    }

    /// Creates a hierarchy depth error.
    #[must_use]
    pub fn hierarchy_too_deep(entity: EntityId, limit: usize) -> Self {
        Self::new(ErrorKind::HierarchyTooDeep { entity, limit })
    }

    /// Returns true if this error rejected a reparent because of a cycle.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, ErrorKind::CycleDetected { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reparenting would make an entity its own ancestor.
    #[error("{}", describe_cycle(.child, .parent))]
    CycleDetected {
        /// The entity being reparented.
        child: EntityId,
        /// The rejected parent.
        parent: EntityId,
    },

    /// An ancestor walk exceeded the configured depth bound.
    #[error("hierarchy deeper than {limit} levels above {entity}")]
    HierarchyTooDeep {
        /// The entity whose ancestors were being walked.
        entity: EntityId,
        /// The configured bound.
        limit: usize,
    },

    /// Entity was never seen or is no longer live.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// Component type name was never registered.
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    /// Component type name was already registered.
    #[error("component type already registered: {0}")]
    DuplicateComponentType(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_cycle(child: &EntityId, parent: &EntityId) -> String {
    if child == parent {
        format!("cannot parent {child} under itself")
    } else {
        format!("cannot parent {child} under {parent}: {parent} is a descendant of {child}")
    }
}
