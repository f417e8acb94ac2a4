//! Change notification channel and authoritative scene storage for scenedex.
//!
//! This crate provides:
//! - [`ChangeEvent`] - Mutation notifications emitted by the storage layer
//! - [`ChangeBus`] - Ordered, synchronous event channel with RAII [`Subscription`]s
//! - [`SceneSource`] - The probe/drain interface index rebuilds read from
//! - [`SceneStore`] - Reference authoritative entity/component/hierarchy store

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod event;
pub mod source;
pub mod store;

pub use bus::{ChangeBus, Subscription, SubscriptionId};
pub use event::{ChangeEvent, EventKind};
pub use source::{SceneSource, SourceEntity};
pub use store::SceneStore;
