//! Cross-layer integration tests for Scenedex
//!
//! Tests that drive a scene store through the change bus and check what the
//! query facade reports.

mod bulk_load;
mod threads;
