//! Scenedex - Incremental structural indices for live scene graphs
//!
//! This crate re-exports all layers of the Scenedex system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: scenedex_index      - Entity/hierarchy/component indices, maintainer, query facade
//! Layer 1: scenedex_storage    - Change bus, events, reference scene store
//! Layer 0: scenedex_foundation - Core types (EntityId, ComponentType, Error)
//! ```

pub use scenedex_foundation as foundation;
pub use scenedex_index as index;
pub use scenedex_storage as storage;
