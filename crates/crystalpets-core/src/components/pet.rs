//! Pet components.

use crystalpets_logic::mining::{IntervalTimer, MiningRules, PetPhase};
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// A pet. Pets are the agents that claim and mine crystals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
}

impl Pet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Mining state for a pet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Miner {
    pub phase: PetPhase<Entity>,
    pub hit_timer: IntervalTimer,
    pub scan_timer: IntervalTimer,
}

impl Miner {
    /// A fresh, idle miner that scans on its first tick.
    pub fn new(rules: &MiningRules) -> Self {
        Self {
            phase: PetPhase::Idle,
            hit_timer: IntervalTimer::new(rules.hit_interval_secs),
            scan_timer: IntervalTimer::primed(rules.scan_interval_secs),
        }
    }

    /// Read by crystals (through their polled flag) to decide whether to
    /// shake.
    pub fn is_actively_mining(&self) -> bool {
        self.phase.is_actively_mining()
    }

    pub fn target(&self) -> Option<Entity> {
        self.phase.target()
    }

    /// Drop the current target and scan again on the next tick.
    pub fn go_idle(&mut self) {
        self.phase = PetPhase::Idle;
        self.hit_timer.reset();
        self.scan_timer = IntervalTimer::primed(self.scan_timer.interval());
    }
}

/// Gems a pet has earned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub gems: u64,
}
