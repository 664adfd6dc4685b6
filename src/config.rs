//! Engine configuration: rating constants and finals policy.
//!
//! Loaded from a JSON file named by `ENGINE_CONFIG`; every field has a default,
//! so a partial file (or none at all) is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "ENGINE_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Constants of the rating model.
///
/// `expected(other, me) = 1 / (1 + 10^(k_factor * (other - me) / divisor))`
/// and `delta = k_factor * (actual - expected)`. The K-factor scales the rating
/// difference inside the exponent; historical ratings depend on that, so it is
/// kept as-is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    #[serde(default = "default_divisor")]
    pub divisor: f64,
    #[serde(default = "default_initial_rating")]
    pub initial_rating: f64,
    /// An abandoned game is rated only if the leading side reached this score.
    #[serde(default = "default_abandon_min_score")]
    pub abandon_min_score: u32,
}

fn default_k_factor() -> f64 {
    40.0
}

fn default_divisor() -> f64 {
    3000.0
}

fn default_initial_rating() -> f64 {
    1500.0
}

fn default_abandon_min_score() -> u32 {
    5
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: default_k_factor(),
            divisor: default_divisor(),
            initial_rating: default_initial_rating(),
            abandon_min_score: default_abandon_min_score(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rating: RatingConfig,
    /// Whether final games move ratings.
    #[serde(default)]
    pub rank_finals: bool,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load from the file named by `ENGINE_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("Loading engine config from {}", path);
                Self::load(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "rating": { "k_factor": 32.0 } }"#).unwrap();
        assert_eq!(cfg.rating.k_factor, 32.0);
        assert_eq!(cfg.rating.divisor, 3000.0);
        assert_eq!(cfg.rating.initial_rating, 1500.0);
        assert!(!cfg.rank_finals);
    }

    #[test]
    fn empty_json_is_default() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }
}
