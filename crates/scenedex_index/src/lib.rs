//! Incremental structural indices over a live scene graph.
//!
//! This crate provides:
//! - [`EntityIndex`] - Live entity set with stable iteration order
//! - [`HierarchyIndex`] - Acyclic parent/child relation
//! - [`ComponentIndex`] - Component type to entity membership
//! - [`IndexMaintainer`] - The single writer, fed by the change bus
//! - [`QueryFacade`] - The read surface every consumer goes through
//! - [`IndexPublisher`] / [`IndexReader`] - Snapshot handoff to other threads
//!
//! # Flow
//!
//! ```text
//! SceneStore ──emit──▶ ChangeBus ──▶ inbox ──drain──▶ IndexMaintainer ──▶ Indices
//!                                                              │
//!                                     QueryFacade / IndexView ◀┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component_index;
pub mod config;
pub mod entity_index;
pub mod hierarchy;
pub mod indices;
pub mod maintainer;
pub mod query;
pub mod shared;

pub use component_index::ComponentIndex;
pub use config::{BulkLoadStrategy, DeletionPolicy, MaintainerConfig};
pub use entity_index::EntityIndex;
pub use hierarchy::HierarchyIndex;
pub use indices::Indices;
pub use maintainer::{DrainReport, IndexMaintainer, RebuildReport, StaleIndexSuspected, StaleReason};
pub use query::{IndexView, QueryFacade};
pub use shared::{IndexPublisher, IndexReader, IndexSnapshot};
