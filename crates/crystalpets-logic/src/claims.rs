//! Resource claim coordinator: which pet is mining which crystal.
//!
//! The coordinator is the single source of truth for claims. It keeps the
//! live set of harvestable resources in registration order, a forward map
//! (resource → claimant) and its inverse (agent → resource), and answers
//! "nearest unclaimed resource" queries for agents scanning for work.
//!
//! # Per-resource state
//!
//! ```text
//! register ──► Unclaimed ──claim──► Claimed(agent)
//!                  ▲                     │
//!                  └──── release / ──────┘
//!                   release_all_claims_of
//!
//! unregister (from either state) ──► removed
//! ```
//!
//! A `claim` against a resource held by a different agent is rejected, not
//! queued. The caller is expected to pick another target on its next scan.
//!
//! # Concurrency
//!
//! All state sits behind one mutex per coordinator. Every operation locks
//! once, so `claim` is a single compare-and-set: two agents racing for the
//! same resource get exactly one `Ok` and one [`ClaimError::AlreadyClaimed`].
//! Resource state (alive, position) is read through a [`ResourceView`]
//! outside the lock, at query time, and never cached.
//!
//! # Handles
//!
//! Resources and agents are opaque `Copy` handles (in the session engine both
//! are `hecs::Entity`). The coordinator stores handles only. Unknown handles
//! are never an error beyond [`ClaimError::ResourceUnknown`]; every other
//! operation treats them as a no-op.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point3;

/// Read access to resource state owned elsewhere.
///
/// Health changes asynchronously relative to queries, so the coordinator
/// asks on every query instead of remembering answers.
pub trait ResourceView<R> {
    /// Whether the resource still has health left.
    fn is_alive(&self, resource: R) -> bool;

    /// Current world position, or `None` if the handle no longer resolves.
    fn position(&self, resource: R) -> Option<Point3>;
}

/// Why a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError<A: fmt::Debug> {
    /// Another agent holds the resource.
    #[error("resource already claimed by {holder:?}")]
    AlreadyClaimed { holder: A },

    /// The resource is not (or no longer) registered.
    #[error("resource is not registered")]
    ResourceUnknown,
}

/// Running counters, for logging and the harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStats {
    /// Claims granted (re-claims by the current holder are not counted).
    pub granted: u64,
    /// Claims refused because another agent held the resource.
    pub denied: u64,
    /// Claims ended by release, agent teardown, or unregistration.
    pub released: u64,
}

struct ClaimTable<R, A> {
    /// Live resources, oldest registration first. Drives tie-breaking.
    live: Vec<R>,
    /// resource → claimant. A key exists only while the resource is claimed.
    claimant: HashMap<R, A>,
    /// agent → claimed resource. At most one entry per agent.
    claimed_by: HashMap<A, R>,
    stats: ClaimStats,
}

impl<R, A> ClaimTable<R, A>
where
    R: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
{
    fn new() -> Self {
        Self {
            live: Vec::new(),
            claimant: HashMap::new(),
            claimed_by: HashMap::new(),
            stats: ClaimStats::default(),
        }
    }

    fn is_live(&self, resource: R) -> bool {
        self.live.contains(&resource)
    }

    fn drop_claim_on(&mut self, resource: R) -> Option<A> {
        let agent = self.claimant.remove(&resource)?;
        self.claimed_by.remove(&agent);
        self.stats.released += 1;
        Some(agent)
    }

    fn drop_claim_of(&mut self, agent: A) -> Option<R> {
        let resource = self.claimed_by.remove(&agent)?;
        self.claimant.remove(&resource);
        self.stats.released += 1;
        Some(resource)
    }
}

/// Shared registry assigning at most one agent to each resource.
///
/// Create one per play session and hand it to spawners and agents (usually
/// behind an `Arc`). Independent sessions never share claims.
pub struct ClaimCoordinator<R, A> {
    table: Mutex<ClaimTable<R, A>>,
}

impl<R, A> ClaimCoordinator<R, A>
where
    R: Copy + Eq + Hash + fmt::Debug,
    A: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            table: Mutex::new(ClaimTable::new()),
        }
    }

    /// Add a resource to the live set, unclaimed.
    ///
    /// Returns `false` (and changes nothing) if it was already registered.
    pub fn register_resource(&self, resource: R) -> bool {
        let mut table = self.table.lock();
        if table.is_live(resource) {
            debug!("register_resource: {:?} already registered", resource);
            return false;
        }
        table.live.push(resource);
        true
    }

    /// Remove a resource from the live set, releasing its claim.
    ///
    /// Returns the agent that lost its claim, if any. Unregistering an
    /// unknown resource is a no-op.
    pub fn unregister_resource(&self, resource: R) -> Option<A> {
        let mut table = self.table.lock();
        let index = table.live.iter().position(|r| *r == resource)?;
        table.live.remove(index);
        let displaced = table.drop_claim_on(resource);
        if let Some(agent) = displaced {
            debug!(
                "unregister_resource: {:?} removed, claim of {:?} released",
                resource, agent
            );
        }
        displaced
    }

    /// Closest live, alive, unclaimed resource to `from` in the horizontal
    /// plane.
    ///
    /// Ties go to the earliest-registered resource. Resources the view
    /// reports as dead or without a position are skipped. Never mutates a
    /// claim. `requester` does not affect the result.
    pub fn find_nearest_unclaimed<V>(&self, from: Point3, requester: A, view: &V) -> Option<R>
    where
        V: ResourceView<R> + ?Sized,
    {
        let candidates = self.unclaimed_snapshot();

        let mut best: Option<(R, f32)> = None;
        for resource in candidates {
            if !view.is_alive(resource) {
                continue;
            }
            let Some(position) = view.position(resource) else {
                continue;
            };
            let distance = from.planar_distance_squared(&position);
            if !distance.is_finite() {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((resource, distance)),
            }
        }

        trace!(
            "find_nearest_unclaimed: {:?} from ({:.2}, {:.2}) -> {:?}",
            requester,
            from.x,
            from.z,
            best.map(|(r, _)| r)
        );
        best.map(|(resource, _)| resource)
    }

    /// Make `agent` the sole claimant of `resource`.
    ///
    /// Succeeds if the resource is unclaimed or already held by `agent`.
    /// Any other resource `agent` held is released first.
    pub fn claim(&self, resource: R, agent: A) -> Result<(), ClaimError<A>> {
        let mut table = self.table.lock();
        if !table.is_live(resource) {
            debug!("claim: {:?} by {:?} refused, not registered", resource, agent);
            return Err(ClaimError::ResourceUnknown);
        }

        match table.claimant.get(&resource).copied() {
            Some(holder) if holder == agent => Ok(()),
            Some(holder) => {
                table.stats.denied += 1;
                debug!(
                    "claim: {:?} by {:?} refused, held by {:?}",
                    resource, agent, holder
                );
                Err(ClaimError::AlreadyClaimed { holder })
            }
            None => {
                table.drop_claim_of(agent);
                table.claimant.insert(resource, agent);
                table.claimed_by.insert(agent, resource);
                table.stats.granted += 1;
                Ok(())
            }
        }
    }

    /// Release `resource` if and only if `agent` currently holds it.
    ///
    /// A late release from an earlier claim cannot clear a newer one.
    /// Returns whether a claim was removed.
    pub fn release(&self, resource: R, agent: A) -> bool {
        let mut table = self.table.lock();
        if table.claimant.get(&resource) != Some(&agent) {
            debug!("release: {:?} is not held by {:?}", resource, agent);
            return false;
        }
        table.drop_claim_on(resource);
        true
    }

    /// Release whatever `agent` holds. Used on agent teardown.
    pub fn release_all_claims_of(&self, agent: A) -> Option<R> {
        self.table.lock().drop_claim_of(agent)
    }

    /// Unregister every resource the view reports as dead.
    ///
    /// Returns each removed resource with the agent whose claim was released.
    pub fn prune_dead<V>(&self, view: &V) -> Vec<(R, Option<A>)>
    where
        V: ResourceView<R> + ?Sized,
    {
        let dead: Vec<R> = self
            .live_resources()
            .into_iter()
            .filter(|r| !view.is_alive(*r))
            .collect();

        let mut removed = Vec::with_capacity(dead.len());
        for resource in dead {
            let mut table = self.table.lock();
            if let Some(index) = table.live.iter().position(|r| *r == resource) {
                table.live.remove(index);
                removed.push((resource, table.drop_claim_on(resource)));
            }
        }
        removed
    }

    /// Unregister every resource and drop every claim.
    ///
    /// Stats are kept; each dropped claim counts as a release. Returns the
    /// number of claims dropped.
    pub fn clear(&self) -> usize {
        let mut table = self.table.lock();
        let dropped = table.claimant.len();
        table.live.clear();
        table.claimant.clear();
        table.claimed_by.clear();
        table.stats.released += dropped as u64;
        debug!("clear: registry emptied, {} claims dropped", dropped);
        dropped
    }

    pub fn is_claimed(&self, resource: R) -> bool {
        self.table.lock().claimant.contains_key(&resource)
    }

    pub fn claimant_of(&self, resource: R) -> Option<A> {
        self.table.lock().claimant.get(&resource).copied()
    }

    /// The resource `agent` currently holds.
    pub fn claim_of(&self, agent: A) -> Option<R> {
        self.table.lock().claimed_by.get(&agent).copied()
    }

    pub fn is_registered(&self, resource: R) -> bool {
        self.table.lock().is_live(resource)
    }

    pub fn live_count(&self) -> usize {
        self.table.lock().live.len()
    }

    pub fn claim_count(&self) -> usize {
        self.table.lock().claimant.len()
    }

    /// Live resources in registration order.
    pub fn live_resources(&self) -> Vec<R> {
        self.table.lock().live.clone()
    }

    pub fn stats(&self) -> ClaimStats {
        self.table.lock().stats
    }

    /// Check that the forward and inverse maps mirror each other and only
    /// reference live resources.
    pub fn is_consistent(&self) -> bool {
        let table = self.table.lock();
        table.claimant.len() == table.claimed_by.len()
            && table.claimant.iter().all(|(resource, agent)| {
                table.is_live(*resource) && table.claimed_by.get(agent) == Some(resource)
            })
    }

    fn unclaimed_snapshot(&self) -> Vec<R> {
        let table = self.table.lock();
        table
            .live
            .iter()
            .copied()
            .filter(|r| !table.claimant.contains_key(r))
            .collect()
    }
}

impl<R, A> Default for ClaimCoordinator<R, A>
where
    R: Copy + Eq + Hash + fmt::Debug,
    A: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, A> fmt::Debug for ClaimCoordinator<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("ClaimCoordinator")
            .field("live", &table.live.len())
            .field("claims", &table.claimant.len())
            .field("stats", &table.stats)
            .finish()
    }
}
