//! Router configuration.
//!
//! Every section falls back to its defaults, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! [walkable]
//! corner_offset = 0.001
//! max_expansions = 100000
//!
//! [search]
//! hub_hop_cost = 0.0
//! max_expansions = 100000
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub walkable: WalkableConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Settings for the built-in per-floor pathfinder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkableConfig {
    /// Distance between an obstacle or wall vertex and the corner points
    /// routed around it, as a fraction of the floor's bounding-box diagonal.
    pub corner_offset: f64,

    /// Nodes to expand before giving up on a local path.
    pub max_expansions: usize,
}

impl Default for WalkableConfig {
    fn default() -> Self {
        Self {
            corner_offset: 1e-3,
            max_expansions: 100_000,
        }
    }
}

/// Settings for the built-in waypoint graph search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cost of an arc that touches a hub, i.e. of changing floors.
    pub hub_hop_cost: f64,

    /// Nodes to expand before reporting "not found".
    pub max_expansions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hub_hop_cost: 0.0,
            max_expansions: 100_000,
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded router config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.walkable.corner_offset > 0.0 && self.walkable.corner_offset < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "walkable.corner_offset must be in (0, 1), got {}",
                self.walkable.corner_offset
            )));
        }
        if self.walkable.max_expansions == 0 {
            return Err(ConfigError::Invalid(
                "walkable.max_expansions must be positive".into(),
            ));
        }
        if !(self.search.hub_hop_cost >= 0.0 && self.search.hub_hop_cost.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "search.hub_hop_cost must be a finite non-negative number, got {}",
                self.search.hub_hop_cost
            )));
        }
        if self.search.max_expansions == 0 {
            return Err(ConfigError::Invalid(
                "search.max_expansions must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RouterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = RouterConfig::from_toml_str(
            r#"
            [search]
            hub_hop_cost = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.search.hub_hop_cost, 2.5);
        assert_eq!(config.search.max_expansions, 100_000);
        assert_eq!(config.walkable, WalkableConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = RouterConfig::from_toml_str("[walkable]\ncorner_offset = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RouterConfig::from_toml_str("[search]\nhub_hop_cost = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RouterConfig::from_toml_str("[search]\nmax_expansions = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = RouterConfig::from_toml_str("[search\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RouterConfig::load("/nonexistent/floor-router.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
