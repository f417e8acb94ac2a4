//! The three indices, bundled so they are cloned and swapped together.

use scenedex_foundation::{Error, ErrorKind, Result};

use crate::component_index::ComponentIndex;
use crate::entity_index::EntityIndex;
use crate::hierarchy::HierarchyIndex;

/// Entity, hierarchy, and component indices as one value.
///
/// Cloning is cheap: every collection inside is persistent, so a clone
/// shares structure with the original until either side is modified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Indices {
    /// Live entity set.
    pub entities: EntityIndex,
    /// Parent/child relation.
    pub hierarchy: HierarchyIndex,
    /// Component membership.
    pub components: ComponentIndex,
}

impl Indices {
    /// Creates empty indices with the given hierarchy depth bound.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            entities: EntityIndex::new(),
            hierarchy: HierarchyIndex::new(max_depth),
            components: ComponentIndex::new(),
        }
    }

    /// Forgets every entity. Registered component types are kept, as the
    /// store keeps them across a clear.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.hierarchy.clear();
        self.components.clear_memberships();
    }

    /// Cross-checks the indices against each other.
    ///
    /// # Errors
    ///
    /// Returns an `Internal` error naming the first broken invariant.
    pub fn validate(&self) -> Result<()> {
        if self.hierarchy.len() != self.entities.len() {
            return Err(internal(format!(
                "hierarchy tracks {} entities, entity index has {}",
                self.hierarchy.len(),
                self.entities.len()
            )));
        }

        for id in self.entities.iter() {
            if !self.hierarchy.contains(id) {
                return Err(internal(format!("{id} is live but not in the hierarchy")));
            }
            for child in self.hierarchy.get_children(id) {
                if self.hierarchy.parent_of(child) != Some(id) {
                    return Err(internal(format!(
                        "{child} is listed under {id} but its parent disagrees"
                    )));
                }
            }
            for component in self.components.types_of(id) {
                if !self.components.has(id, component) {
                    return Err(internal(format!(
                        "{id} lists {component:?} but is missing from its set"
                    )));
                }
            }
        }

        for (child, parent) in self.hierarchy.links() {
            if !self.entities.contains(parent) {
                return Err(internal(format!("{child} has dead parent {parent}")));
            }
            if !self.hierarchy.get_children(parent).contains(&child) {
                return Err(internal(format!(
                    "{child} points at {parent} but is not among its children"
                )));
            }
        }

        for component in self.components.component_types() {
            for member in self.components.entities_with(component) {
                if !self.entities.contains(member) {
                    return Err(internal(format!(
                        "dead {member} still carries {component:?}"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn internal(message: String) -> Error {
    Error::new(ErrorKind::Internal(message))
}
