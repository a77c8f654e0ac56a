//! Free-lists for short-lived collections.
//!
//! A [`CollectionPool`] serves one collection type; [`Pools`] keeps one
//! pool per type so callers can ask for "a `Vec<u64>`" or "a
//! `HashMap<u64, Handle>`" from the same place.
//!
//! Released values are moved into the pool, so a collection cannot be
//! handed back twice.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::trace;

use crate::config::PoolConfig;
use crate::recycle::Recycle;

/// A free-list of one collection type.
#[derive(Debug)]
pub struct CollectionPool<T> {
    free: Vec<T>,
    config: PoolConfig,
}

impl<T: Recycle + Default> CollectionPool<T> {
    /// Create an empty pool.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            free: Vec::new(),
            config,
        }
    }

    /// Take an empty collection, reusing a released one when available.
    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Clear `value` and keep it for a later [`CollectionPool::acquire`].
    pub fn release(&mut self, mut value: T) {
        if self.free.len() >= self.config.max_retained {
            trace!(
                kind = std::any::type_name::<T>(),
                "collection pool full, dropping release"
            );
            return;
        }
        value.recycle(self.config.shrink_threshold);
        self.free.push(value);
    }

    /// How many released collections are waiting for reuse.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.free.len()
    }
}

impl<T: Recycle + Default> Default for CollectionPool<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Collection pools keyed by collection type.
#[derive(Debug, Default)]
pub struct Pools {
    pools: HashMap<TypeId, Box<dyn Any>>,
    config: PoolConfig,
}

impl Pools {
    /// Create an empty set of pools sharing `config`.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            pools: HashMap::new(),
            config,
        }
    }

    /// Take an empty `T`, reusing a released one when available.
    pub fn acquire<T: Recycle + Default + 'static>(&mut self) -> T {
        self.pool_mut::<T>().acquire()
    }

    /// Return a `T` for reuse.
    pub fn release<T: Recycle + Default + 'static>(&mut self, value: T) {
        self.pool_mut::<T>().release(value);
    }

    /// How many released `T`s are waiting for reuse.
    #[must_use]
    pub fn retained<T: Recycle + Default + 'static>(&self) -> usize {
        self.pools
            .get(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_ref::<CollectionPool<T>>())
            .map_or(0, CollectionPool::retained)
    }

    fn pool_mut<T: Recycle + Default + 'static>(&mut self) -> &mut CollectionPool<T> {
        let config = self.config;
        self.pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(CollectionPool::<T>::new(config)))
            .downcast_mut()
            .expect("collection pool keyed by a different type")
    }
}
