//! Pool configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every pool a world owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// How many released instances a single pool keeps before dropping
    /// further releases.
    pub max_retained: usize,
    /// Released collections whose capacity is above this many elements, and
    /// more than four times what they last held, are shrunk.
    pub shrink_threshold: usize,
}

impl PoolConfig {
    /// Override how many instances a pool retains.
    #[must_use]
    pub fn with_max_retained(mut self, max_retained: usize) -> Self {
        self.max_retained = max_retained;
        self
    }

    /// Override the shrink threshold.
    #[must_use]
    pub fn with_shrink_threshold(mut self, shrink_threshold: usize) -> Self {
        self.shrink_threshold = shrink_threshold;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained: 1000,
            shrink_threshold: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PoolConfig = serde_json::from_str(r#"{ "max_retained": 8 }"#).unwrap();
        assert_eq!(config.max_retained, 8);
        assert_eq!(config.shrink_threshold, 64);
    }
}
