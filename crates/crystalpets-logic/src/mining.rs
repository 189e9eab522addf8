//! Pet mining rules: phases, range checks and interval timers.
//!
//! A pet cycles through three phases:
//!
//! | Phase | Meaning | Actively mining |
//! |-------|---------|-----------------|
//! | `Idle` | No target; scans the coordinator every `scan_interval_secs` | no |
//! | `Approaching(r)` | Holds a claim on `r`, walking toward it | no |
//! | `Mining(r)` | Within `mining_range`, hitting `r` every `hit_interval_secs` | yes |
//!
//! A pet drops back to `Idle` as soon as its target dies, disappears, or is
//! no longer claimed by it.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;

/// Tunable mining parameters shared by every pet in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningRules {
    /// Horizontal distance at which a pet can hit its crystal.
    pub mining_range: f32,
    /// Health removed from the crystal per hit.
    pub damage_per_hit: f32,
    /// Seconds between hits while mining.
    pub hit_interval_secs: f32,
    /// Gems awarded to the pet per hit.
    pub gems_per_hit: u32,
    /// Seconds between coordinator scans while idle.
    pub scan_interval_secs: f32,
    /// Walking speed in units per second.
    pub pet_speed: f32,
}

impl Default for MiningRules {
    fn default() -> Self {
        Self {
            mining_range: 1.5,
            damage_per_hit: 10.0,
            hit_interval_secs: 0.5,
            gems_per_hit: 1,
            scan_interval_secs: 1.0,
            pet_speed: 3.0,
        }
    }
}

/// Where a pet is in its work loop. `R` is the resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetPhase<R> {
    #[default]
    Idle,
    Approaching(R),
    Mining(R),
}

impl<R: Copy> PetPhase<R> {
    pub fn target(&self) -> Option<R> {
        match self {
            PetPhase::Idle => None,
            PetPhase::Approaching(r) | PetPhase::Mining(r) => Some(*r),
        }
    }

    /// True only once in range and applying damage, not while approaching.
    pub fn is_actively_mining(&self) -> bool {
        matches!(self, PetPhase::Mining(_))
    }
}

/// What a pet knows about its target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetStatus {
    pub position: Point3,
    pub alive: bool,
    /// Whether the coordinator still lists this pet as the claimant.
    pub held: bool,
}

pub fn in_range(pet: &Point3, crystal: &Point3, rules: &MiningRules) -> bool {
    pet.planar_distance(crystal) <= rules.mining_range
}

/// Next phase for a pet that may have a target.
///
/// `target` is `None` when the target handle no longer resolves. Idle pets
/// stay idle; picking a new target is the scan's job.
pub fn advance_phase<R: Copy>(
    phase: PetPhase<R>,
    pet: Point3,
    target: Option<TargetStatus>,
    rules: &MiningRules,
) -> PetPhase<R> {
    let Some(resource) = phase.target() else {
        return PetPhase::Idle;
    };
    match target {
        Some(status) if status.alive && status.held => {
            if in_range(&pet, &status.position, rules) {
                PetPhase::Mining(resource)
            } else {
                PetPhase::Approaching(resource)
            }
        }
        _ => PetPhase::Idle,
    }
}

/// Fires every `interval` seconds of accumulated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    interval: f32,
    elapsed: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    /// A timer that fires on its first tick.
    pub fn primed(interval: f32) -> Self {
        Self {
            interval,
            elapsed: interval.max(0.0),
        }
    }

    /// Advance by `delta` seconds, returning how many times the timer fired.
    ///
    /// A non-positive interval fires once per tick.
    pub fn tick(&mut self, delta: f32) -> u32 {
        if self.interval <= 0.0 {
            return 1;
        }
        self.elapsed += delta.max(0.0);
        let fired = (self.elapsed / self.interval).floor();
        self.elapsed -= fired * self.interval;
        fired as u32
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }
}

pub fn gems_for_hits(hits: u32, rules: &MiningRules) -> u64 {
    hits as u64 * rules.gems_per_hit as u64
}
