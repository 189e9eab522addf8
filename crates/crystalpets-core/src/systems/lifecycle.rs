//! Spawn/despawn helpers and the depleted-crystal cleanup.
//!
//! Every path that creates or destroys a crystal or pet goes through here,
//! so the coordinator is told about it exactly once.

use crystalpets_logic::claims::ClaimCoordinator;
use crystalpets_logic::geometry::Point3;
use crystalpets_logic::mining::MiningRules;
use hecs::{Entity, World};
use log::{debug, info};

use crate::components::{Crystal, Miner, Pet, Position, Shake, Wallet};

pub type Claims = ClaimCoordinator<Entity, Entity>;

/// Spawn a crystal and register it as claimable.
pub fn spawn_crystal(world: &mut World, claims: &Claims, at: Point3, crystal: Crystal) -> Entity {
    let entity = world.spawn((crystal, Position(at), Shake::default()));
    claims.register_resource(entity);
    entity
}

/// Despawn a crystal, releasing whoever was mining it.
///
/// Safe to call on a crystal that is already gone.
pub fn despawn_crystal(world: &mut World, claims: &Claims, crystal: Entity) -> Option<Entity> {
    let displaced = claims.unregister_resource(crystal);
    let _ = world.despawn(crystal);
    displaced
}

pub fn spawn_pet(
    world: &mut World,
    name: impl Into<String>,
    at: Point3,
    rules: &MiningRules,
    gems: u64,
) -> Entity {
    world.spawn((
        Pet::new(name),
        Position(at),
        Miner::new(rules),
        Wallet { gems },
    ))
}

/// Despawn a pet after releasing its claim.
pub fn despawn_pet(world: &mut World, claims: &Claims, pet: Entity) {
    if let Some(crystal) = claims.release_all_claims_of(pet) {
        debug!("despawn_pet: {:?} released {:?}", pet, crystal);
    }
    let _ = world.despawn(pet);
}

/// Despawn every depleted crystal and unregister it.
///
/// Returns the despawned crystals. Their claimants find out on their next
/// behavior tick and go back to scanning.
pub fn crystal_cleanup_system(world: &mut World, claims: &Claims) -> Vec<Entity> {
    let depleted: Vec<Entity> = world
        .query::<&Crystal>()
        .iter()
        .filter(|(_, crystal)| !crystal.is_alive())
        .map(|(entity, _)| entity)
        .collect();

    for &crystal in &depleted {
        let displaced = despawn_crystal(world, claims, crystal);
        info!("Crystal {:?} depleted (miner: {:?})", crystal, displaced);
    }
    depleted
}
