//! Component type tokens and their registry.
//!
//! Component types are registered once by name and referred to afterwards by
//! a small interned token, so hot paths never hash strings.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Interned component type token.
///
/// Tokens are only meaningful relative to the [`ComponentRegistry`] that
/// issued them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentType(pub(crate) u32);

impl ComponentType {
    /// Returns the raw index of this component type.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Creates a token from a raw index.
    ///
    /// Intended for tests and for tokens received from an external registry.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.0)
    }
}

/// Registry mapping component type names to tokens and back.
///
/// Not thread-safe; the owning store serializes access.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentRegistry {
    /// Names indexed by token.
    names: Vec<Arc<str>>,
    /// Map from name to token.
    tokens: HashMap<Arc<str>, ComponentType>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component type, returning its token.
    ///
    /// Registering a name twice returns the same token.
    ///
    /// # Panics
    ///
    /// Panics if the number of registered types exceeds `u32::MAX`.
    pub fn register(&mut self, name: &str) -> ComponentType {
        if let Some(&token) = self.tokens.get(name) {
            return token;
        }

        let idx = u32::try_from(self.names.len()).expect("too many component types");
        let arc: Arc<str> = name.into();
        self.names.push(arc.clone());
        let token = ComponentType(idx);
        self.tokens.insert(arc, token);
        token
    }

    /// Registers a component type that must not already exist.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateComponentType`] if the name is taken.
    pub fn register_new(&mut self, name: &str) -> Result<ComponentType> {
        if self.tokens.contains_key(name) {
            return Err(Error::new(ErrorKind::DuplicateComponentType(
                name.to_string(),
            )));
        }
        Ok(self.register(name))
    }

    /// Looks up a previously registered name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ComponentType> {
        self.tokens.get(name).copied()
    }

    /// Looks up a name, failing if it was never registered.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownComponentType`] for unregistered names.
    pub fn resolve(&self, name: &str) -> Result<ComponentType> {
        self.lookup(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownComponentType(name.to_string())))
    }

    /// Gets the name of a component type.
    #[must_use]
    pub fn name(&self, token: ComponentType) -> Option<&str> {
        self.names.get(token.0 as usize).map(AsRef::as_ref)
    }

    /// Iterates over every registered token in registration order.
    pub fn types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        (0..self.names.len()).map(|i| ComponentType(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
