//! Bit layouts shared by the identifier variants.
//!
//! Every identifier packs three fields into a `u64`, high to low:
//!
//! ```text
//! | time (seconds since epoch) | shard | counter |
//! ```
//!
//! Because the timestamp occupies the high bits, numeric order of ids follows
//! the order in which they were minted.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 2020-01-01T00:00:00Z as unix seconds.
pub const EPOCH_2020: i64 = 1_577_836_800;

/// Exclusive upper bound for unit-id shard numbers (10-bit field).
pub const MAX_SHARD: u32 = 1 << 10;

/// The reference point timestamps are counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Epoch {
    /// A fixed unix time in seconds.
    Fixed(i64),
    /// Midnight UTC on January 1st of the year the allocator was created in.
    StartOfYear,
}

impl Epoch {
    /// Resolve the epoch to unix seconds relative to `now`.
    #[must_use]
    pub fn resolve(self, now: DateTime<Utc>) -> i64 {
        match self {
            Self::Fixed(secs) => secs,
            Self::StartOfYear => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .map_or_else(|| now.timestamp(), |start| start.timestamp()),
        }
    }
}

/// Field widths and epoch of one identifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdLayout {
    /// Width of the per-second sequence counter.
    pub counter_bits: u32,
    /// Width of the shard field (0 when the variant has none).
    pub shard_bits: u32,
    /// Where timestamps are counted from.
    pub epoch: Epoch,
}

impl IdLayout {
    /// Long-lived object ids.
    pub const GENERAL: IdLayout = IdLayout {
        counter_bits: 16,
        shard_bits: 0,
        epoch: Epoch::Fixed(EPOCH_2020),
    };

    /// Ephemeral per-instance ids. The year-relative epoch leaves room for a
    /// wider counter.
    pub const INSTANCE: IdLayout = IdLayout {
        counter_bits: 18,
        shard_bits: 0,
        epoch: Epoch::StartOfYear,
    };

    /// Sharded unit ids carrying a 10-bit zone number.
    pub const UNIT: IdLayout = IdLayout {
        counter_bits: 16,
        shard_bits: 10,
        epoch: Epoch::Fixed(EPOCH_2020),
    };

    /// Width of the timestamp field.
    #[must_use]
    pub const fn time_bits(&self) -> u32 {
        64 - self.counter_bits - self.shard_bits
    }

    /// Largest counter value that fits in the counter field.
    #[must_use]
    pub const fn max_counter(&self) -> u32 {
        ((1u64 << self.counter_bits) - 1) as u32
    }

    /// Exclusive upper bound for shard numbers.
    #[must_use]
    pub const fn shard_count(&self) -> u32 {
        1 << self.shard_bits
    }

    /// Pack the fields into an identifier. Out-of-range fields are masked.
    #[must_use]
    pub const fn pack(&self, parts: IdParts) -> u64 {
        let counter = parts.counter as u64 & mask(self.counter_bits);
        let shard = parts.shard as u64 & mask(self.shard_bits);
        let time = parts.time & mask(self.time_bits());
        (time << (self.counter_bits + self.shard_bits)) | (shard << self.counter_bits) | counter
    }

    /// Split an identifier back into its fields.
    #[must_use]
    pub const fn unpack(&self, id: u64) -> IdParts {
        IdParts {
            time: id >> (self.counter_bits + self.shard_bits),
            shard: ((id >> self.counter_bits) & mask(self.shard_bits)) as u32,
            counter: (id & mask(self.counter_bits)) as u32,
        }
    }
}

const fn mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// The decoded fields of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdParts {
    /// Seconds since the layout's epoch.
    pub time: u64,
    /// Shard number (always 0 for unsharded layouts).
    pub shard: u32,
    /// Sequence number within the second.
    pub counter: u32,
}
