//! Pet behavior system - scan, claim, approach, mine
//!
//! Each tick every pet either:
//! - is idle and, when its scan timer fires, asks the coordinator for the
//!   nearest unclaimed crystal and tries to claim it;
//! - has a target and re-checks it (alive, still claimed by this pet), then
//!   walks toward it or hits it.
//!
//! A refused claim is not retried in the same tick. The pet waits for its
//! next scan and will usually be offered a different crystal then.

use crystalpets_logic::claims::ClaimError;
use crystalpets_logic::mining::{advance_phase, gems_for_hits, MiningRules, PetPhase, TargetStatus};
use hecs::{Entity, World};
use log::{debug, trace};

use crate::components::{Crystal, Miner, Movement, Position, Wallet};
use crate::systems::lifecycle::Claims;
use crate::view::WorldView;

/// What happened during one behavior tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BehaviorReport {
    pub claims_granted: u32,
    pub claims_refused: u32,
    pub hits: u32,
    pub gems_earned: u64,
}

pub fn pet_behavior_system(
    world: &mut World,
    claims: &Claims,
    rules: &MiningRules,
    delta_seconds: f32,
) -> BehaviorReport {
    let mut report = BehaviorReport::default();

    let pets: Vec<(Entity, Position, Miner)> = world
        .query::<(&Position, &Miner)>()
        .iter()
        .map(|(entity, (pos, miner))| (entity, *pos, *miner))
        .collect();

    for (pet, pos, mut miner) in pets {
        if miner.phase == PetPhase::Idle && miner.scan_timer.tick(delta_seconds) > 0 {
            if let Some(crystal) = scan_and_claim(world, claims, pet, pos, &mut report) {
                miner.phase = PetPhase::Approaching(crystal);
            }
        }

        update_target(world, claims, rules, pet, pos, &mut miner, delta_seconds, &mut report);

        if let Ok(mut stored) = world.get::<&mut Miner>(pet) {
            *stored = miner;
        }
    }

    report
}

fn scan_and_claim(
    world: &World,
    claims: &Claims,
    pet: Entity,
    pos: Position,
    report: &mut BehaviorReport,
) -> Option<Entity> {
    let crystal = claims.find_nearest_unclaimed(pos.0, pet, &WorldView(world))?;
    match claims.claim(crystal, pet) {
        Ok(()) => {
            report.claims_granted += 1;
            trace!("{:?} claimed {:?}", pet, crystal);
            Some(crystal)
        }
        Err(ClaimError::AlreadyClaimed { holder }) => {
            report.claims_refused += 1;
            debug!("{:?} lost {:?} to {:?}, waiting for next scan", pet, crystal, holder);
            None
        }
        Err(ClaimError::ResourceUnknown) => {
            report.claims_refused += 1;
            None
        }
    }
}

/// Re-validate the pet's target and act on it: walk, hit, or give up.
#[allow(clippy::too_many_arguments)]
fn update_target(
    world: &mut World,
    claims: &Claims,
    rules: &MiningRules,
    pet: Entity,
    pos: Position,
    miner: &mut Miner,
    delta_seconds: f32,
    report: &mut BehaviorReport,
) {
    let Some(crystal) = miner.target() else {
        return;
    };

    let status = target_status(world, claims, pet, crystal);
    let next = advance_phase(miner.phase, pos.0, status, rules);

    match next {
        PetPhase::Idle => {
            // Stale-safe: a no-op if the claim already moved on.
            claims.release(crystal, pet);
            miner.go_idle();
            let _ = world.remove_one::<Movement>(pet);
        }
        PetPhase::Approaching(_) => {
            if let Some(status) = status {
                let _ = world.insert_one(pet, Movement::new(status.position, rules.pet_speed));
            }
            miner.phase = next;
        }
        PetPhase::Mining(_) => {
            if !miner.is_actively_mining() {
                miner.hit_timer.reset();
                let _ = world.remove_one::<Movement>(pet);
            }
            miner.phase = next;

            let hits = miner.hit_timer.tick(delta_seconds);
            if hits > 0 && mine(world, pet, crystal, hits, rules, report) {
                claims.release(crystal, pet);
                miner.go_idle();
            }
        }
    }
}

fn target_status(world: &World, claims: &Claims, pet: Entity, crystal: Entity) -> Option<TargetStatus> {
    let alive = world.get::<&Crystal>(crystal).ok()?.is_alive();
    let position = world.get::<&Position>(crystal).ok()?.0;
    Some(TargetStatus {
        position,
        alive,
        held: claims.claimant_of(crystal) == Some(pet),
    })
}

/// Apply `hits` to the crystal and pay the pet. Returns `true` if the
/// crystal was depleted.
fn mine(
    world: &mut World,
    pet: Entity,
    crystal: Entity,
    hits: u32,
    rules: &MiningRules,
    report: &mut BehaviorReport,
) -> bool {
    let mut landed = 0;
    let mut depleted = false;
    if let Ok(mut target) = world.get::<&mut Crystal>(crystal) {
        while landed < hits && target.is_alive() {
            landed += 1;
            depleted = target.apply_damage(rules.damage_per_hit);
        }
    }

    let gems = gems_for_hits(landed, rules);
    if let Ok(mut wallet) = world.get::<&mut Wallet>(pet) {
        wallet.gems += gems;
    }
    report.hits += landed;
    report.gems_earned += gems;
    depleted
}
