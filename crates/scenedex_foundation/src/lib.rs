//! Core identifiers, component type tokens, and persistent collections for scenedex.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque, densely packed entity identifiers
//! - [`ComponentType`] - Interned component type tokens
//! - [`ComponentRegistry`] - Registration and name resolution for component types
//! - [`Error`] - Rich error types with context
//! - [`OrderedSet`] - Persistent insertion-ordered set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod component;
pub mod entity;
pub mod error;

pub use collections::OrderedSet;
pub use component::{ComponentRegistry, ComponentType};
pub use entity::EntityId;
pub use error::{Error, ErrorKind, Result};
