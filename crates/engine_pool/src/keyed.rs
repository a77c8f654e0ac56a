//! Free-lists of whole objects, keyed by kind.

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::PoolConfig;

/// Released objects grouped by a key, usually the object's concrete type.
///
/// Callers reset objects before releasing them; the pool only stores them.
#[derive(Debug)]
pub struct KeyedPool<K, V> {
    free: HashMap<K, Vec<V>>,
    config: PoolConfig,
}

impl<K: Eq + Hash, V> KeyedPool<K, V> {
    /// Create an empty pool.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            free: HashMap::new(),
            config,
        }
    }

    /// Take a released object of kind `key`, if any.
    pub fn acquire(&mut self, key: &K) -> Option<V> {
        self.free.get_mut(key).and_then(Vec::pop)
    }

    /// Keep `value` for a later [`KeyedPool::acquire`] with the same key.
    ///
    /// Returns `false` if the pool for `key` is full and `value` was dropped.
    pub fn release(&mut self, key: K, value: V) -> bool {
        let list = self.free.entry(key).or_default();
        if list.len() >= self.config.max_retained {
            return false;
        }
        list.push(value);
        true
    }

    /// How many objects of kind `key` are waiting for reuse.
    #[must_use]
    pub fn retained(&self, key: &K) -> usize {
        self.free.get(key).map_or(0, Vec::len)
    }

    /// Drop every retained object.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<K: Eq + Hash, V> Default for KeyedPool<K, V> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
