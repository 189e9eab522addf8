//! Spawner system - keeps the arena stocked with crystals

use crystalpets_logic::config::SessionConfig;
use crystalpets_logic::geometry::Point3;
use hecs::World;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::lifecycle::{spawn_crystal, Claims};
use crate::components::Crystal;

/// Pending crystal respawns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// Seconds left before each queued crystal appears
    pub pending: Vec<f32>,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` replacements, each due after `delay` seconds.
    pub fn schedule(&mut self, count: usize, delay: f32) {
        self.pending.extend(std::iter::repeat(delay.max(0.0)).take(count));
    }
}

/// Uniformly random ground point within `radius` of the origin.
pub fn random_arena_point<R: Rng>(rng: &mut R, radius: f32) -> Point3 {
    let r = radius * rng.gen::<f32>().sqrt();
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    Point3::flat(r * theta.cos(), r * theta.sin())
}

/// Count down queued respawns and spawn the ones that are due, never
/// exceeding `max_crystals` live crystals.
///
/// Returns how many crystals were spawned.
pub fn spawner_system<R: Rng>(
    world: &mut World,
    claims: &Claims,
    spawner: &mut Spawner,
    config: &SessionConfig,
    rng: &mut R,
    delta_seconds: f32,
) -> usize {
    for timer in &mut spawner.pending {
        *timer -= delta_seconds;
    }

    let alive = world
        .query::<&Crystal>()
        .iter()
        .filter(|(_, c)| c.is_alive())
        .count();
    let room = config.max_crystals.saturating_sub(alive);
    let due = spawner.pending.iter().filter(|t| **t <= 0.0).count().min(room);

    let mut spawned = 0;
    spawner.pending.retain(|t| {
        if *t <= 0.0 && spawned < due {
            spawned += 1;
            false
        } else {
            true
        }
    });

    for _ in 0..spawned {
        let at = random_arena_point(rng, config.arena_radius);
        spawn_crystal(world, claims, at, Crystal::new(config.crystal_health));
    }
    spawned
}
