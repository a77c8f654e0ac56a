//! # engine_id
//!
//! Time-ordered 64-bit identifiers for the entity graph.
//!
//! This crate provides:
//!
//! - [`IdLayout`]: field widths and epoch of an identifier variant.
//! - [`GeneralIds`], [`InstanceIds`], [`UnitIds`]: the three variants.
//! - [`IdGenerators`]: one of each, owned by a world.
//! - [`Clock`]: the time source, swappable for tests.

pub mod clock;
pub mod error;
pub mod generator;
pub mod layout;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::IdError;
pub use generator::{GeneralIds, IdGenerator, IdGenerators, InstanceIds, UnitIds};
pub use layout::{EPOCH_2020, Epoch, IdLayout, IdParts, MAX_SHARD};
