//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: EntityId, ComponentType, Error, and persistent collections.

mod collections;
mod identifiers;
