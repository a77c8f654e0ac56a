//! Wall-clock sources for identifier allocation.
//!
//! Allocators never read the system time directly; they go through a
//! [`Clock`] so tests can freeze or step time.

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// A source of the current UTC time.
pub trait Clock: std::fmt::Debug {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock, stepped in whole seconds.
#[derive(Debug, Clone)]
pub struct ManualClock {
    unix_secs: Cell<i64>,
}

impl ManualClock {
    /// Create a clock frozen at the given unix time (seconds).
    #[must_use]
    pub fn at(unix_secs: i64) -> Self {
        Self {
            unix_secs: Cell::new(unix_secs),
        }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.unix_secs.set(self.unix_secs.get() + secs);
    }

    /// Set the clock to an absolute unix time.
    pub fn set(&self, unix_secs: i64) {
        self.unix_secs.set(unix_secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_secs.get(), 0).unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
