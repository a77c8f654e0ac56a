//! # engine_entity
//!
//! The entity ownership graph.
//!
//! Every domain object lives in a [`World`] as an entity with a
//! time-ordered id. Entities own children (keyed by id) and components (at
//! most one per concrete type); disposing an entity disposes everything it
//! owns, components first. Lifecycle hooks are routed through a
//! [`Dispatcher`] so the caller decides when awake, start, update, destroy
//! and enable actually run.
//!
//! This crate provides:
//!
//! - [`World`]: the graph, its factories, lookups and disposal.
//! - [`EntityType`] and the hook traits ([`Awake`], [`Start`], [`Update`],
//!   [`Destroy`], [`Enable`]) that concrete types implement.
//! - [`TypeRegistry`]: per-type hooks and capability casts.
//! - [`Dispatcher`] and the default [`HookDispatcher`].

pub mod config;
pub mod dispatch;
mod dispose;
pub mod entity;
pub mod error;
mod hierarchy;
pub mod object;
pub mod registry;
#[cfg(test)]
mod testing;
pub mod world;

pub use config::WorldConfig;
pub use dispatch::{AwakeCall, Dispatcher, HookDispatcher};
pub use entity::{EntityRef, Relation, Status};
pub use error::GraphError;
pub use object::{Awake, AwakeArgs, Destroy, Enable, EntityType, Object, Start, Update};
pub use registry::{Hooks, TypeBuilder, TypeInfo, TypeRegistry};
pub use world::{Scene, World, WorldClock};
