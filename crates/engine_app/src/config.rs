//! Loading the world configuration.

use std::path::Path;

use anyhow::{Context, Result};
use engine_entity::WorldConfig;

/// Environment variable naming a JSON file with a [`WorldConfig`].
pub const GRAPH_CONFIG_ENV: &str = "GRAPH_CONFIG";

/// Load the configuration named by `GRAPH_CONFIG`, or the defaults when the
/// variable is unset.
pub fn load() -> Result<WorldConfig> {
    match std::env::var_os(GRAPH_CONFIG_ENV) {
        Some(path) => from_path(path),
        None => Ok(WorldConfig::default()),
    }
}

/// Read a configuration file.
pub fn from_path(path: impl AsRef<Path>) -> Result<WorldConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Parse a configuration document. Missing fields take their defaults.
pub fn parse(json: &str) -> Result<WorldConfig> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial() {
        let config = parse(r#"{ "zone": 12 }"#).unwrap();
        assert_eq!(config.zone, 12);
        assert_eq!(config.pool, engine_pool::PoolConfig::default());
    }

    #[test]
    fn test_parse_pool_override() {
        let config = parse(r#"{ "pool": { "max_retained": 8 } }"#).unwrap();
        assert_eq!(config.zone, 0);
        assert_eq!(config.pool.max_retained, 8);
        assert_eq!(config.pool.shrink_threshold, 64);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("zone = 3").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = from_path("/nonexistent/graph.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
