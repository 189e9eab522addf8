//! Shake system - crystals shake while their claimant is mining them

use hecs::World;

use super::lifecycle::Claims;
use crate::components::{Miner, Shake};

/// Refresh each crystal's `shaking` flag.
///
/// The claimant's mining state is read through its public accessor, at most
/// once per staleness window (see `PolledFlag`). A crystal with no claimant,
/// or a claimant that is still walking over, does not shake.
pub fn shake_system(world: &World, claims: &Claims, delta_seconds: f32) {
    for (crystal, shake) in world.query::<&mut Shake>().iter() {
        let status = &mut shake.status;
        shake.shaking = status.read(delta_seconds, || {
            claims
                .claimant_of(crystal)
                .and_then(|pet| world.get::<&Miner>(pet).ok().map(|m| m.is_actively_mining()))
                .unwrap_or(false)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Crystal;
    use crate::systems::lifecycle::{spawn_crystal, spawn_pet};
    use crystalpets_logic::geometry::Point3;
    use crystalpets_logic::mining::{MiningRules, PetPhase};
    use crystalpets_logic::status::MINING_STATUS_STALENESS_SECS;

    fn shaking(world: &World, crystal: hecs::Entity) -> bool {
        world.get::<&Shake>(crystal).unwrap().shaking
    }

    #[test]
    fn test_shakes_only_while_actively_mined() {
        let mut world = World::new();
        let claims = Claims::new();
        let rules = MiningRules::default();
        let crystal = spawn_crystal(&mut world, &claims, Point3::ZERO, Crystal::new(10.0));
        let pet = spawn_pet(&mut world, "Pip", Point3::ZERO, &rules, 0);

        shake_system(&world, &claims, 0.0);
        assert!(!shaking(&world, crystal));

        claims.claim(crystal, pet).unwrap();
        world.get::<&mut Miner>(pet).unwrap().phase = PetPhase::Approaching(crystal);
        shake_system(&world, &claims, MINING_STATUS_STALENESS_SECS);
        assert!(!shaking(&world, crystal));

        world.get::<&mut Miner>(pet).unwrap().phase = PetPhase::Mining(crystal);
        shake_system(&world, &claims, MINING_STATUS_STALENESS_SECS);
        assert!(shaking(&world, crystal));
    }

    #[test]
    fn test_shake_reading_is_bounded_stale() {
        let mut world = World::new();
        let claims = Claims::new();
        let rules = MiningRules::default();
        let crystal = spawn_crystal(&mut world, &claims, Point3::ZERO, Crystal::new(10.0));
        let pet = spawn_pet(&mut world, "Pip", Point3::ZERO, &rules, 0);
        claims.claim(crystal, pet).unwrap();
        world.get::<&mut Miner>(pet).unwrap().phase = PetPhase::Mining(crystal);

        shake_system(&world, &claims, 0.0);
        assert!(shaking(&world, crystal));

        claims.release(crystal, pet);
        shake_system(&world, &claims, MINING_STATUS_STALENESS_SECS / 2.0);
        assert!(shaking(&world, crystal), "still within the staleness window");

        shake_system(&world, &claims, MINING_STATUS_STALENESS_SECS);
        assert!(!shaking(&world, crystal));
    }
}
