//! Persistent collections with structural sharing.
//!
//! Thin wrappers around the `im` crate's persistent data structures. Cloning
//! any of these is O(1), which is what lets the index layer publish whole
//! snapshots to readers without copying.

use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Persistent set that iterates in insertion order.
///
/// Each element is stamped with a monotonically increasing sequence number on
/// insertion. Membership lives in a hash trie, order lives in a B-tree keyed
/// by sequence number, so insert, remove and contains never scan.
///
/// Re-inserting a present element keeps its original position.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderedSet<T>
where
    T: Clone + Eq + Hash,
{
    /// Element -> sequence number.
    positions: im::HashMap<T, u64>,
    /// Sequence number -> element.
    order: im::OrdMap<u64, T>,
    /// Next sequence number to hand out.
    next_seq: u64,
}

impl<T: Clone + Eq + Hash> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: im::HashMap::new(),
            order: im::OrdMap::new(),
            next_seq: 0,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks if the set contains a value.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.positions.contains_key(value)
    }

    /// Appends a value. Returns false if it was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.positions.contains_key(&value) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.positions.insert(value.clone(), seq);
        self.order.insert(seq, value);
        true
    }

    /// Removes a value. Returns false if it was absent.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.positions.remove(value) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.positions = im::HashMap::new();
        self.order = im::OrdMap::new();
        self.next_seq = 0;
    }

    /// Iterates over the elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.values()
    }

    /// Returns the first element in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.order.get_min().map(|(_, v)| v)
    }

    /// Copies the elements out in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: Clone + Eq + Hash + fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Two sets are equal when they hold the same elements in the same order.
impl<T: Clone + Eq + Hash> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Clone + Eq + Hash> Eq for OrderedSet<T> {}

impl<T: Clone + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: Clone + Eq + Hash> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}
