//! World configuration.

use engine_pool::PoolConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Zone number stamped into unit ids minted by this world.
    pub zone: u32,
    /// Pool tuning for collections and entity instances.
    pub pool: PoolConfig,
}

impl WorldConfig {
    /// Create a config with default pools for `zone`.
    #[must_use]
    pub fn new(zone: u32) -> Self {
        Self {
            zone,
            pool: PoolConfig::default(),
        }
    }

    /// Override the pool tuning.
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}
