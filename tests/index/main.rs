//! Integration tests for Layer 2: Index
//!
//! Tests for the three indices, the maintainer's event handling, and configuration.

mod components;
mod config;
mod deferral;
