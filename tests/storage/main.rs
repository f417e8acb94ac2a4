//! Integration tests for Layer 1: Storage
//!
//! Tests for the change bus, event tags, and the reference scene store.

mod bus;
mod store;
