//! Crystal components.

use crystalpets_logic::status::PolledFlag;
use serde::{Deserialize, Serialize};

/// A harvestable crystal. Owns its health pool; nothing else mutates it
/// except through [`Crystal::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    health: f32,
    max_health: f32,
}

impl Crystal {
    pub fn new(max_health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Restore a crystal with some health already mined off.
    pub fn with_health(max_health: f32, health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: health.clamp(0.0, max_health),
            max_health,
        }
    }

    /// Remove `amount` health. Returns `true` if this hit depleted it.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        !self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

/// Visual shake while the claimant is actively mining.
///
/// `shaking` is derived from a bounded-staleness read, see
/// [`crystalpets_logic::status`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shake {
    pub shaking: bool,
    pub status: PolledFlag,
}
