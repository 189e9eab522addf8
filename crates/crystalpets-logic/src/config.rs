//! Session configuration.
//!
//! Defines how many crystals stay alive, how tough they are, how pets mine,
//! and the seed for spawn placement. Loaded from JSON at runtime; any field
//! left out falls back to [`SessionConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mining::MiningRules;

/// Errors from loading or validating a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for crystal placement.
    pub seed: u64,
    /// Crystals the spawner keeps alive at once.
    pub max_crystals: usize,
    /// Starting health of each crystal.
    pub crystal_health: f32,
    /// Delay before a depleted crystal is replaced, in seconds.
    pub respawn_delay_secs: f32,
    /// Crystals and pets are placed within this radius of the origin.
    pub arena_radius: f32,
    /// Pets spawned when the session is populated.
    pub pet_count: usize,
    pub mining: MiningRules,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_crystals: 12,
            crystal_health: 100.0,
            respawn_delay_secs: 3.0,
            arena_radius: 20.0,
            pet_count: 4,
            mining: MiningRules::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values that would stall or break a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("crystal_health", self.crystal_health)?;
        positive("arena_radius", self.arena_radius)?;
        positive("mining.mining_range", self.mining.mining_range)?;
        positive("mining.damage_per_hit", self.mining.damage_per_hit)?;
        positive("mining.hit_interval_secs", self.mining.hit_interval_secs)?;
        positive("mining.scan_interval_secs", self.mining.scan_interval_secs)?;
        positive("mining.pet_speed", self.mining.pet_speed)?;
        if self.respawn_delay_secs.is_nan() || self.respawn_delay_secs < 0.0 {
            return Err(ConfigError::Invalid {
                field: "respawn_delay_secs",
                reason: format!("must be >= 0, got {}", self.respawn_delay_secs),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}
