//! Session engine - main entry point for running a mining session

use std::sync::Arc;

use crystalpets_logic::config::SessionConfig;
use hecs::{Entity, World};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::systems::*;

/// Running totals across a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionTotals {
    pub hits: u64,
    pub gems_earned: u64,
    pub crystals_depleted: u64,
    pub crystals_spawned: u64,
    pub claims_granted: u64,
    pub claims_refused: u64,
}

/// Main session engine
pub struct SessionEngine {
    /// ECS world containing all crystals and pets
    pub world: World,
    /// Session time in seconds
    pub elapsed: f64,
    /// Claim coordinator shared with anything else driving this session
    claims: Arc<Claims>,
    config: SessionConfig,
    spawner: Spawner,
    rng: StdRng,
    totals: SessionTotals,
    time_scale: f32,
}

impl SessionEngine {
    /// Create an empty session with its own coordinator
    pub fn new(config: SessionConfig) -> Self {
        Self::with_coordinator(config, Arc::new(Claims::new()))
    }

    /// Create an empty session using an existing coordinator
    pub fn with_coordinator(config: SessionConfig, claims: Arc<Claims>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            world: World::new(),
            elapsed: 0.0,
            claims,
            config,
            spawner: Spawner::new(),
            rng,
            totals: SessionTotals::default(),
            time_scale: 1.0,
        }
    }

    /// Spawn the configured crystals and pets
    pub fn populate(&mut self) {
        for _ in 0..self.config.max_crystals {
            self.spawn_random_crystal();
        }
        for i in 0..self.config.pet_count {
            let at = random_arena_point(&mut self.rng, self.config.arena_radius);
            spawn_pet(
                &mut self.world,
                format!("Pet {}", i + 1),
                at,
                &self.config.mining,
                0,
            );
        }
        info!(
            "Session populated: {} crystals, {} pets",
            self.crystal_count(),
            self.pet_count()
        );
    }

    /// Update the session by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        let delta = delta_seconds * self.time_scale;
        self.elapsed += delta as f64;

        let report = pet_behavior_system(&mut self.world, &self.claims, &self.config.mining, delta);
        self.totals.hits += report.hits as u64;
        self.totals.gems_earned += report.gems_earned;
        self.totals.claims_granted += report.claims_granted as u64;
        self.totals.claims_refused += report.claims_refused as u64;

        movement_system(&mut self.world, delta);

        let depleted = crystal_cleanup_system(&mut self.world, &self.claims);
        self.totals.crystals_depleted += depleted.len() as u64;
        self.spawner
            .schedule(depleted.len(), self.config.respawn_delay_secs);

        let spawned = spawner_system(
            &mut self.world,
            &self.claims,
            &mut self.spawner,
            &self.config,
            &mut self.rng,
            delta,
        );
        self.totals.crystals_spawned += spawned as u64;

        shake_system(&self.world, &self.claims, delta);
    }

    /// Spawn a crystal at a random arena point
    pub fn spawn_random_crystal(&mut self) -> Entity {
        let at = random_arena_point(&mut self.rng, self.config.arena_radius);
        self.totals.crystals_spawned += 1;
        spawn_crystal(
            &mut self.world,
            &self.claims,
            at,
            Crystal::new(self.config.crystal_health),
        )
    }

    /// Remove a pet, releasing its claim
    pub fn remove_pet(&mut self, pet: Entity) {
        despawn_pet(&mut self.world, &self.claims, pet);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn claims(&self) -> &Arc<Claims> {
        &self.claims
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    pub fn crystal_count(&self) -> usize {
        self.world.query::<&Crystal>().iter().count()
    }

    pub fn pet_count(&self) -> usize {
        self.world.query::<&Pet>().iter().count()
    }

    /// Pets currently in range and hitting a crystal
    pub fn mining_pet_count(&self) -> usize {
        self.world
            .query::<&Miner>()
            .iter()
            .filter(|(_, miner)| miner.is_actively_mining())
            .count()
    }

    /// Sum of all pets' gems
    pub fn total_gems(&self) -> u64 {
        self.world
            .query::<&Wallet>()
            .iter()
            .map(|(_, wallet)| wallet.gems)
            .sum()
    }

    /// Check that no crystal has two pets targeting it, and that every
    /// targeting pet's claim is recorded by the coordinator
    pub fn claims_are_exclusive(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for (pet, miner) in self.world.query::<&Miner>().iter() {
            if let Some(crystal) = miner.target() {
                if !seen.insert(crystal) || self.claims.claimant_of(crystal) != Some(pet) {
                    return false;
                }
            }
        }
        self.claims.is_consistent()
    }

    /// Save session state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_session(writer, &self.world, self.elapsed, &self.config, &self.spawner)
    }

    /// Load session state from a reader.
    ///
    /// Claims are not saved. The session's coordinator is emptied in place,
    /// so anyone sharing it sees the loaded world; alive crystals are
    /// registered again and every pet starts idle.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_session(reader)?;

        self.world = World::new();
        self.claims.clear();
        self.elapsed = loaded.elapsed;
        self.spawner = loaded.spawner;
        self.rng = StdRng::seed_from_u64(loaded.config.seed ^ loaded.elapsed.to_bits());

        for record in &loaded.crystals {
            let crystal = Crystal::with_health(record.max_health, record.health);
            if crystal.is_alive() {
                spawn_crystal(&mut self.world, &self.claims, record.position, crystal);
            }
        }
        for record in loaded.pets {
            spawn_pet(
                &mut self.world,
                record.name,
                record.position,
                &loaded.config.mining,
                record.gems,
            );
        }
        self.config = loaded.config;

        info!(
            "Session loaded at {:.1}s: {} crystals, {} pets",
            self.elapsed,
            self.crystal_count(),
            self.pet_count()
        );
        Ok(())
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SessionConfig {
        SessionConfig {
            max_crystals: 5,
            pet_count: 3,
            arena_radius: 6.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = SessionEngine::new(small_config());
        assert_eq!(engine.pet_count(), 0);
        assert_eq!(engine.crystal_count(), 0);
        assert_eq!(engine.elapsed, 0.0);
    }

    #[test]
    fn test_populate() {
        let mut engine = SessionEngine::new(small_config());
        engine.populate();
        assert_eq!(engine.crystal_count(), 5);
        assert_eq!(engine.pet_count(), 3);
        assert_eq!(engine.claims().live_count(), 5);
    }

    #[test]
    fn test_pets_earn_gems_over_time() {
        let mut engine = SessionEngine::new(small_config());
        engine.populate();

        for _ in 0..600 {
            engine.update(0.1);
            assert!(engine.claims_are_exclusive());
        }

        assert!(engine.total_gems() > 0);
        assert_eq!(engine.totals().gems_earned, engine.total_gems());
    }

    #[test]
    fn test_time_scale() {
        let mut engine = SessionEngine::new(small_config());
        engine.set_time_scale(2.0);
        engine.update(1.0);
        assert!((engine.elapsed - 2.0).abs() < 1e-6);

        engine.set_time_scale(-1.0);
        assert_eq!(engine.time_scale(), 0.0);
    }

    #[test]
    fn test_remove_pet_frees_its_crystal() {
        let mut engine = SessionEngine::new(small_config());
        engine.populate();
        engine.update(0.1);

        let (pet, target) = engine
            .world
            .query::<&Miner>()
            .iter()
            .find_map(|(pet, miner)| miner.target().map(|t| (pet, t)))
            .expect("some pet should have a target");

        engine.remove_pet(pet);
        assert!(!engine.claims().is_claimed(target));
        assert_eq!(engine.pet_count(), 2);
    }

    #[test]
    fn test_totals_track_claims() {
        let mut engine = SessionEngine::new(small_config());
        engine.populate();
        engine.update(0.1);

        let totals = engine.totals();
        assert_eq!(totals.claims_granted, 3);
        assert_eq!(totals.claims_granted, engine.claims().stats().granted);
        assert_eq!(engine.claims().claim_count(), 3);
    }

    #[test]
    fn test_independent_sessions() {
        let mut a = SessionEngine::new(small_config());
        let mut b = SessionEngine::new(small_config());
        a.populate();
        b.populate();
        a.update(0.1);

        assert!(a.claims().claim_count() > 0);
        assert_eq!(b.claims().claim_count(), 0);
    }
}
