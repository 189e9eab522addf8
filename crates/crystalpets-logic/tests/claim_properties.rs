//! Property tests for the claim coordinator.
//!
//! Exercises mutual exclusion under real threads, nearest-query correctness
//! against a brute-force scan, and the claim lifecycle around teardown.

use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

use crystalpets_logic::claims::{ClaimCoordinator, ClaimError, ResourceView};
use crystalpets_logic::geometry::Point3;

// ── Helpers ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Field {
    crystals: HashMap<u32, (Point3, bool)>,
}

impl ResourceView<u32> for Field {
    fn is_alive(&self, resource: u32) -> bool {
        self.crystals.get(&resource).map(|c| c.1).unwrap_or(false)
    }

    fn position(&self, resource: u32) -> Option<Point3> {
        self.crystals.get(&resource).map(|c| c.0)
    }
}

/// Deterministic pseudo-random points on a small integer grid so ties occur.
fn scatter(count: u32, seed: u64) -> Vec<(u32, Point3)> {
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) % 11) as f32 - 5.0
    };
    (0..count)
        .map(|id| {
            let x = next();
            let z = next();
            (id, Point3::flat(x, z))
        })
        .collect()
}

fn build(points: &[(u32, Point3)]) -> (ClaimCoordinator<u32, u32>, Field) {
    let coordinator = ClaimCoordinator::new();
    let mut field = Field::default();
    for &(id, position) in points {
        field.crystals.insert(id, (position, true));
        coordinator.register_resource(id);
    }
    (coordinator, field)
}

/// Reference answer: smallest distance, then lowest registration index.
fn brute_force(points: &[(u32, Point3)], from: Point3, skip: &[u32]) -> Option<u32> {
    points
        .iter()
        .filter(|(id, _)| !skip.contains(id))
        .min_by(|(_, a), (_, b)| {
            from.planar_distance_squared(a)
                .partial_cmp(&from.planar_distance_squared(b))
                .unwrap()
        })
        .map(|(id, _)| *id)
}

// ── Mutual exclusion ───────────────────────────────────────────────────

#[test]
fn concurrent_claims_yield_exactly_one_winner() {
    for round in 0..50 {
        let coordinator = Arc::new(ClaimCoordinator::<u32, u32>::new());
        coordinator.register_resource(round);

        let agents = 8;
        let barrier = Arc::new(Barrier::new(agents));
        let handles: Vec<_> = (0..agents as u32)
            .map(|agent| {
                let coordinator = Arc::clone(&coordinator);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    coordinator.claim(round, 1000 + agent)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| matches!(r, Err(ClaimError::AlreadyClaimed { .. })))
            .count();

        assert_eq!(winners, 1, "round {}", round);
        assert_eq!(losers, agents - 1, "round {}", round);
        assert!(coordinator.is_consistent());
    }
}

#[test]
fn concurrent_scan_and_claim_never_double_assigns() {
    let points = scatter(16, 7);
    let (coordinator, field) = build(&points);
    let coordinator = Arc::new(coordinator);
    let field = Arc::new(field);

    let agents = 12u32;
    let barrier = Arc::new(Barrier::new(agents as usize));
    let handles: Vec<_> = (0..agents)
        .map(|agent| {
            let coordinator = Arc::clone(&coordinator);
            let field = Arc::clone(&field);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Retry like a pet would on its next scans.
                for _ in 0..32 {
                    let Some(target) =
                        coordinator.find_nearest_unclaimed(Point3::ZERO, agent, field.as_ref())
                    else {
                        return None;
                    };
                    if coordinator.claim(target, agent).is_ok() {
                        return Some(target);
                    }
                }
                None
            })
        })
        .collect();

    let mut won: Vec<u32> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();
    let total = won.len();
    won.sort_unstable();
    won.dedup();

    assert_eq!(won.len(), total, "a resource was granted twice");
    assert_eq!(total, agents as usize);
    assert_eq!(coordinator.claim_count(), agents as usize);
    assert!(coordinator.is_consistent());
}

// ── Nearest correctness ────────────────────────────────────────────────

#[test]
fn nearest_matches_brute_force() {
    for seed in 1..40 {
        let points = scatter(25, seed);
        let (coordinator, field) = build(&points);
        let from = Point3::flat((seed % 7) as f32 - 3.0, (seed % 5) as f32 - 2.0);

        assert_eq!(
            coordinator.find_nearest_unclaimed(from, 0, &field),
            brute_force(&points, from, &[]),
            "seed {}",
            seed
        );
    }
}

#[test]
fn nearest_skips_claimed_like_brute_force() {
    let points = scatter(20, 99);
    let (coordinator, field) = build(&points);
    let mut claimed = Vec::new();

    for agent in 0..20u32 {
        let expected = brute_force(&points, Point3::ZERO, &claimed);
        let found = coordinator.find_nearest_unclaimed(Point3::ZERO, agent, &field);
        assert_eq!(found, expected);

        let target = found.unwrap();
        coordinator.claim(target, agent).unwrap();
        claimed.push(target);
    }

    assert_eq!(coordinator.find_nearest_unclaimed(Point3::ZERO, 99, &field), None);
}

#[test]
fn closest_dead_resource_is_excluded() {
    let points = vec![(1, Point3::flat(0.0, 0.0)), (2, Point3::flat(4.0, 4.0))];
    let (coordinator, mut field) = build(&points);
    field.crystals.get_mut(&1).unwrap().1 = false;

    assert_eq!(
        coordinator.find_nearest_unclaimed(Point3::ZERO, 0, &field),
        Some(2)
    );
    assert!(coordinator.is_registered(1));
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn unregister_releases_holder() {
    let points = vec![(1, Point3::flat(1.0, 0.0))];
    let (coordinator, _field) = build(&points);
    coordinator.claim(1, 7).unwrap();

    assert_eq!(coordinator.unregister_resource(1), Some(7));
    assert_eq!(coordinator.claimant_of(1), None);
    assert_eq!(coordinator.release_all_claims_of(7), None);
    assert_eq!(coordinator.unregister_resource(1), None);
    assert!(coordinator.is_consistent());
}

#[test]
fn agent_teardown_frees_resource_for_others() {
    let points = vec![(1, Point3::flat(1.0, 0.0))];
    let (coordinator, field) = build(&points);
    coordinator.claim(1, 7).unwrap();
    assert_eq!(coordinator.find_nearest_unclaimed(Point3::ZERO, 8, &field), None);

    assert_eq!(coordinator.release_all_claims_of(7), Some(1));
    assert_eq!(coordinator.release_all_claims_of(7), None);
    assert_eq!(
        coordinator.find_nearest_unclaimed(Point3::ZERO, 8, &field),
        Some(1)
    );
    assert_eq!(coordinator.claim(1, 8), Ok(()));
}

#[test]
fn sessions_do_not_share_claims() {
    let first: ClaimCoordinator<u32, u32> = ClaimCoordinator::new();
    let second: ClaimCoordinator<u32, u32> = ClaimCoordinator::new();
    first.register_resource(1);
    second.register_resource(1);

    first.claim(1, 10).unwrap();
    assert!(!second.is_claimed(1));
    assert_eq!(second.claim(1, 20), Ok(()));
}
