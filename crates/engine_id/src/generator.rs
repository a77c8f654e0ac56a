//! Identifier allocators.
//!
//! [`IdGenerator`] implements the shared timestamp + sequence algorithm; the
//! three variants wrap it with their own [`IdLayout`]. None of them are
//! thread-safe: each instance expects a single caller, and a world owns its
//! own set through [`IdGenerators`].

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::error::IdError;
use crate::layout::{IdLayout, IdParts};

/// The shared allocation algorithm, parameterised by layout.
#[derive(Debug)]
pub struct IdGenerator<C = SystemClock> {
    layout: IdLayout,
    /// Epoch resolved to unix seconds at construction.
    epoch: i64,
    clock: C,
    last_time: u64,
    counter: u32,
}

impl IdGenerator<SystemClock> {
    /// Create a generator for `layout` reading the system clock.
    #[must_use]
    pub fn new(layout: IdLayout) -> Self {
        Self::with_clock(layout, SystemClock)
    }
}

impl<C: Clock> IdGenerator<C> {
    /// Create a generator for `layout` reading `clock`.
    #[must_use]
    pub fn with_clock(layout: IdLayout, clock: C) -> Self {
        let epoch = layout.epoch.resolve(clock.now());
        Self {
            layout,
            epoch,
            clock,
            last_time: 0,
            counter: 0,
        }
    }

    /// The layout this generator packs ids with.
    #[must_use]
    pub fn layout(&self) -> &IdLayout {
        &self.layout
    }

    /// How many seconds the last issued timestamp runs ahead of the clock.
    ///
    /// Non-zero only after sequence overflows borrowed future seconds.
    #[must_use]
    pub fn drift(&self) -> u64 {
        self.last_time.saturating_sub(self.elapsed())
    }

    fn elapsed(&self) -> u64 {
        (self.clock.now().timestamp() - self.epoch).max(0) as u64
    }

    /// Advance the (time, counter) state for one allocation.
    fn advance(&mut self) -> (u64, u32) {
        let now = self.elapsed();
        if now > self.last_time {
            self.last_time = now;
            self.counter = 0;
        } else {
            self.counter += 1;
            if self.counter > self.layout.max_counter() {
                self.last_time += 1;
                self.counter = 0;
                warn!(
                    max = self.layout.max_counter(),
                    drift = self.last_time - now,
                    "identifier rate exceeded capacity, borrowing the next second"
                );
            }
        }
        (self.last_time, self.counter)
    }

    /// Mint an id in `shard`.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::ShardOutOfRange`] if `shard` does not fit the
    /// layout's shard field.
    pub fn generate_in_shard(&mut self, shard: u32) -> Result<u64, IdError> {
        let max = self.layout.shard_count();
        if shard >= max {
            return Err(IdError::ShardOutOfRange { shard, max });
        }
        let (time, counter) = self.advance();
        Ok(self.layout.pack(IdParts {
            time,
            shard,
            counter,
        }))
    }

    /// Decode an id minted by this generator.
    #[must_use]
    pub fn unpack(&self, id: u64) -> IdParts {
        self.layout.unpack(id)
    }

    /// The wall-clock second encoded in an id minted by this generator.
    #[must_use]
    pub fn timestamp_of(&self, id: u64) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.unpack(id).time).ok()?;
        DateTime::from_timestamp(self.epoch.checked_add(secs)?, 0)
    }
}

macro_rules! unsharded_variant {
    ($(#[$meta:meta])* $name:ident, $layout:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<C = SystemClock>(IdGenerator<C>);

        impl $name<SystemClock> {
            /// Create an allocator reading the system clock.
            #[must_use]
            pub fn new() -> Self {
                Self(IdGenerator::new($layout))
            }
        }

        impl Default for $name<SystemClock> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<C: Clock> $name<C> {
            /// Create an allocator reading `clock`.
            #[must_use]
            pub fn with_clock(clock: C) -> Self {
                Self(IdGenerator::with_clock($layout, clock))
            }

            /// Mint the next id.
            pub fn generate(&mut self) -> u64 {
                let (time, counter) = self.0.advance();
                $layout.pack(IdParts {
                    time,
                    shard: 0,
                    counter,
                })
            }

            /// Decode an id minted by this allocator.
            #[must_use]
            pub fn unpack(&self, id: u64) -> IdParts {
                self.0.unpack(id)
            }

            /// The underlying generator.
            #[must_use]
            pub fn generator(&self) -> &IdGenerator<C> {
                &self.0
            }
        }
    };
}

unsharded_variant!(
    /// General object ids: 16-bit counter, seconds since 2020-01-01 UTC.
    GeneralIds,
    IdLayout::GENERAL
);

unsharded_variant!(
    /// Instance ids: 18-bit counter, seconds since the start of the current year.
    InstanceIds,
    IdLayout::INSTANCE
);

/// Unit ids: 16-bit counter plus a caller-supplied 10-bit shard (zone).
#[derive(Debug)]
pub struct UnitIds<C = SystemClock>(IdGenerator<C>);

impl UnitIds<SystemClock> {
    /// Create an allocator reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self(IdGenerator::new(IdLayout::UNIT))
    }
}

impl Default for UnitIds<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> UnitIds<C> {
    /// Create an allocator reading `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self(IdGenerator::with_clock(IdLayout::UNIT, clock))
    }

    /// Mint the next unit id in `shard`.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::ShardOutOfRange`] if `shard >= MAX_SHARD`.
    pub fn generate(&mut self, shard: u32) -> Result<u64, IdError> {
        self.0.generate_in_shard(shard)
    }

    /// Decode a unit id.
    #[must_use]
    pub fn unpack(&self, id: u64) -> IdParts {
        self.0.unpack(id)
    }

    /// The underlying generator.
    #[must_use]
    pub fn generator(&self) -> &IdGenerator<C> {
        &self.0
    }
}

/// One allocator per variant, owned by a single world.
#[derive(Debug)]
pub struct IdGenerators<C = SystemClock> {
    /// Entity ids.
    pub general: GeneralIds<C>,
    /// Entity instance ids.
    pub instance: InstanceIds<C>,
    /// Sharded unit ids.
    pub unit: UnitIds<C>,
}

impl IdGenerators<SystemClock> {
    /// Create all three allocators on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for IdGenerators<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> IdGenerators<C> {
    /// Create all three allocators sharing `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            general: GeneralIds::with_clock(clock.clone()),
            instance: InstanceIds::with_clock(clock.clone()),
            unit: UnitIds::with_clock(clock),
        }
    }
}
