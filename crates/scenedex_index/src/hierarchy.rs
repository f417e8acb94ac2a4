//! Parent/child relation with bidirectional indices.
//!
//! Both directions are stored so that parent lookup, child listing, and root
//! listing never scan. The relation is kept acyclic: every reparent walks the
//! ancestors of the proposed parent before touching anything.

use scenedex_foundation::{EntityId, Error, OrderedSet, Result};

use crate::config::DeletionPolicy;

/// Acyclic parent/child index.
///
/// Invariants:
/// - `parent_of(c) == Some(p)` iff `c` is in `get_children(p)`
/// - no entity is its own ancestor
/// - an entity is either a root or has exactly one parent
#[derive(Clone, Debug)]
pub struct HierarchyIndex {
    /// child -> parent.
    parents: im::HashMap<EntityId, EntityId>,
    /// parent -> children in sibling order. Absent when there are none.
    children: im::HashMap<EntityId, OrderedSet<EntityId>>,
    /// Entities without a parent, in the order they became roots.
    roots: OrderedSet<EntityId>,
    /// Bound on ancestor walks.
    max_depth: usize,
}

impl Default for HierarchyIndex {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl PartialEq for HierarchyIndex {
    fn eq(&self, other: &Self) -> bool {
        self.parents == other.parents && self.children == other.children && self.roots == other.roots
    }
}

impl Eq for HierarchyIndex {}

impl HierarchyIndex {
    /// Creates an empty hierarchy whose ancestor walks stop after `max_depth` steps.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            parents: im::HashMap::new(),
            children: im::HashMap::new(),
            roots: OrderedSet::new(),
            max_depth,
        }
    }

    /// Returns the ancestor walk bound.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Checks if an entity is tracked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.roots.contains(&id) || self.parents.contains_key(&id)
    }

    /// Returns the number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len() + self.parents.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts tracking an entity as a root. Tracked entities are left alone.
    pub fn insert_root(&mut self, id: EntityId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.roots.insert(id)
    }

    /// Moves `child` under `parent`, or to the roots with `None`.
    ///
    /// Setting the current parent again is a no-op and keeps sibling order.
    ///
    /// # Errors
    ///
    /// - `CycleDetected` if `parent` is `child` or one of its descendants
    /// - `HierarchyTooDeep` if the ancestor walk hits the depth bound
    /// - `UnknownEntity` if either entity is untracked
    ///
    /// Nothing is modified when an error is returned.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<()> {
        if !self.contains(child) {
            return Err(Error::unknown_entity(child));
        }
        if let Some(p) = parent {
            self.check_can_parent(child, p)?;
        }

        let current = self.parents.get(&child).copied();
        if current == parent {
            return Ok(());
        }

        self.detach(child);
        match parent {
            Some(p) => {
                self.parents.insert(child, p);
                self.children
                    .entry(p)
                    .or_insert_with(OrderedSet::new)
                    .insert(child);
            }
            None => {
                self.roots.insert(child);
            }
        }
        Ok(())
    }

    /// Validates a proposed link without applying it.
    ///
    /// `child` need not be tracked yet.
    ///
    /// # Errors
    ///
    /// The same errors as [`set_parent`](Self::set_parent), except that an
    /// untracked `child` is accepted.
    pub fn check_can_parent(&self, child: EntityId, parent: EntityId) -> Result<()> {
        if !self.contains(parent) {
            return Err(Error::unknown_entity(parent));
        }
        if parent == child {
            return Err(Error::cycle_detected(child, parent));
        }

        let mut cursor = Some(parent);
        let mut steps = 0;
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(Error::cycle_detected(child, parent));
            }
            steps += 1;
            if steps > self.max_depth {
                return Err(Error::hierarchy_too_deep(parent, self.max_depth));
            }
            cursor = self.parents.get(&ancestor).copied();
        }
        Ok(())
    }

    /// Unlinks `id` from its parent's child list or from the roots.
    fn detach(&mut self, id: EntityId) {
        if let Some(old) = self.parents.remove(&id) {
            let now_empty = match self.children.get_mut(&old) {
                Some(siblings) => {
                    siblings.remove(&id);
                    siblings.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.children.remove(&old);
            }
        } else {
            self.roots.remove(&id);
        }
    }

    /// Returns the parent of an entity.
    #[must_use]
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id).copied()
    }

    /// Returns the children of an entity in sibling order.
    ///
    /// Leaves and unknown entities both yield an empty list.
    #[must_use]
    pub fn get_children(&self, id: EntityId) -> Vec<EntityId> {
        self.children
            .get(&id)
            .map(OrderedSet::to_vec)
            .unwrap_or_default()
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: EntityId) -> usize {
        self.children.get(&id).map_or(0, OrderedSet::len)
    }

    /// Returns every entity without a parent.
    #[must_use]
    pub fn get_root_entities(&self) -> Vec<EntityId> {
        self.roots.to_vec()
    }

    /// Returns the number of ancestors of an entity.
    ///
    /// Roots and unknown entities have depth 0. Computed by walking up, so it
    /// is never stale after a reparent.
    #[must_use]
    pub fn get_depth(&self, id: EntityId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parents.get(&id);
        while let Some(parent) = cursor {
            depth += 1;
            if depth >= self.max_depth {
                break;
            }
            cursor = self.parents.get(parent);
        }
        depth
    }

    /// Returns every descendant of an entity, depth-first, parents before children.
    #[must_use]
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.get_children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(kids) = self.children.get(&current) {
                let kids = kids.to_vec();
                stack.extend(kids.into_iter().rev());
            }
        }
        out
    }

    /// Stops tracking an entity.
    ///
    /// With [`DeletionPolicy::PromoteChildren`] the direct children become
    /// roots, appended in sibling order, and only `id` is returned. With
    /// [`DeletionPolicy::Cascade`] the whole subtree is dropped and returned,
    /// `id` first. Unknown entities return an empty list.
    pub fn remove_entity(&mut self, id: EntityId, policy: DeletionPolicy) -> Vec<EntityId> {
        if !self.contains(id) {
            return Vec::new();
        }

        match policy {
            DeletionPolicy::PromoteChildren => {
                self.detach(id);
                if let Some(kids) = self.children.remove(&id) {
                    for child in kids.iter() {
                        self.parents.remove(child);
                        self.roots.insert(*child);
                    }
                }
                vec![id]
            }
            DeletionPolicy::Cascade => {
                let mut removed = vec![id];
                removed.extend(self.descendants(id));
                self.detach(id);
                for victim in &removed {
                    self.parents.remove(victim);
                    self.children.remove(victim);
                    self.roots.remove(victim);
                }
                removed
            }
        }
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.parents = im::HashMap::new();
        self.children = im::HashMap::new();
        self.roots.clear();
    }

    /// Iterates over every `(child, parent)` link.
    pub fn links(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.parents.iter().map(|(c, p)| (*c, *p))
    }
}
