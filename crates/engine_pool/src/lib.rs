//! # engine_pool
//!
//! Allocation reuse for the entity graph, which creates and destroys objects
//! at a very high rate.
//!
//! This crate provides:
//!
//! - [`Recycle`]: clearing (and shrinking) collections for reuse.
//! - [`CollectionPool`] / [`Pools`]: free-lists of empty collections.
//! - [`KeyedPool`]: free-lists of whole objects keyed by their kind.
//! - [`SlotPool`]: generation-checked slot storage; stale handles are
//!   rejected rather than freeing a slot twice.

pub mod collection;
pub mod config;
pub mod error;
pub mod keyed;
pub mod recycle;
pub mod slot;

pub use collection::{CollectionPool, Pools};
pub use config::PoolConfig;
pub use error::PoolError;
pub use keyed::KeyedPool;
pub use recycle::Recycle;
pub use slot::{SlotHandle, SlotPool};
