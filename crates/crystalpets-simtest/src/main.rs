//! CrystalPets Headless Session Harness
//!
//! Validates claim coordination and full mining sessions without a renderer.
//! Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p crystalpets-simtest
//!   cargo run -p crystalpets-simtest -- --verbose --seconds 300
//!   cargo run -p crystalpets-simtest -- --config session.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use clap::Parser;
use crystalpets_core::prelude::*;
use crystalpets_logic::claims::{ClaimCoordinator, ClaimError, ResourceView};
use crystalpets_logic::config::SessionConfig;
use crystalpets_logic::geometry::Point3;
use log::{error, info};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "crystalpets-simtest")]
#[command(version)]
#[command(about = "Headless checks for CrystalPets claim coordination")]
struct Cli {
    /// Print every check, not just failures
    #[arg(short, long)]
    verbose: bool,

    /// Session config JSON (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds for the timed session
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Session tick length in seconds
    #[arg(long, default_value_t = 0.05)]
    step: f32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Flat test field of numbered crystals.
#[derive(Default)]
struct Field {
    crystals: HashMap<u32, (Point3, bool)>,
}

impl Field {
    fn with(points: &[(u32, f32, f32)], claims: &ClaimCoordinator<u32, u32>) -> Self {
        let mut field = Self::default();
        for &(id, x, z) in points {
            field.crystals.insert(id, (Point3::flat(x, z), true));
            claims.register_resource(id);
        }
        field
    }
}

impl ResourceView<u32> for Field {
    fn is_alive(&self, resource: u32) -> bool {
        self.crystals.get(&resource).map(|c| c.1).unwrap_or(false)
    }

    fn position(&self, resource: u32) -> Option<Point3> {
        self.crystals.get(&resource).map(|c| c.0)
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => match SessionConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                std::process::exit(2);
            }
        },
        None => SessionConfig::default(),
    };

    println!("=== CrystalPets Session Harness ===\n");

    let mut results = Vec::new();

    // 1. Coordinator scenario and properties
    results.extend(validate_scenario());
    results.extend(validate_lifecycle());

    // 2. Threaded claim race
    results.extend(validate_claim_race());

    // 3. Timed session
    results.extend(validate_session(&config, cli.seconds, cli.step));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Coordinator ──────────────────────────────────────────────────────

fn validate_scenario() -> Vec<TestResult> {
    println!("--- Nearest / Claim Scenario ---");
    let claims = ClaimCoordinator::<u32, u32>::new();
    let field = Field::with(&[(1, 0.0, 0.0), (2, 5.0, 0.0), (3, 1.0, 0.0)], &claims);
    let (a, b) = (100, 101);
    let origin = Point3::flat(0.0, 0.0);

    let first = claims.find_nearest_unclaimed(origin, a, &field);
    let claimed = claims.claim(1, a);
    let second = claims.find_nearest_unclaimed(origin, b, &field);
    claims.unregister_resource(1);

    vec![
        TestResult::check(
            "scenario_nearest_at_zero_distance",
            first == Some(1),
            format!("A found {:?}", first),
        ),
        TestResult::check("scenario_claim_granted", claimed.is_ok(), format!("{:?}", claimed)),
        TestResult::check(
            "scenario_claimed_crystal_skipped",
            second == Some(3),
            format!("B found {:?}", second),
        ),
        TestResult::check(
            "scenario_unregister_clears_claimant",
            claims.claimant_of(1).is_none(),
            format!("claimant {:?}", claims.claimant_of(1)),
        ),
    ]
}

fn validate_lifecycle() -> Vec<TestResult> {
    println!("--- Claim Lifecycle ---");
    let mut results = Vec::new();
    let claims = ClaimCoordinator::<u32, u32>::new();
    let mut field = Field::with(&[(1, 0.0, 0.0), (2, 4.0, 0.0), (3, -4.0, 0.0)], &claims);

    // Round trip
    claims.claim(1, 10).ok();
    claims.release(1, 10);
    results.push(TestResult::check(
        "claim_release_round_trip",
        !claims.is_claimed(1),
        "released crystal is unclaimed",
    ));

    // Conflict
    claims.claim(1, 10).ok();
    let conflict = claims.claim(1, 11);
    results.push(TestResult::check(
        "second_claim_rejected",
        conflict == Err(ClaimError::AlreadyClaimed { holder: 10 }),
        format!("{:?}", conflict),
    ));

    // Agent teardown
    let freed = claims.release_all_claims_of(10);
    let again = claims.release_all_claims_of(10);
    results.push(TestResult::check(
        "agent_teardown_idempotent",
        freed == Some(1) && again.is_none() && !claims.is_claimed(1),
        format!("first {:?}, second {:?}", freed, again),
    ));

    // Unregister releases
    claims.claim(2, 12).ok();
    let displaced = claims.unregister_resource(2);
    let repeat = claims.unregister_resource(2);
    results.push(TestResult::check(
        "unregister_releases_and_is_idempotent",
        displaced == Some(12) && repeat.is_none() && claims.release_all_claims_of(12).is_none(),
        format!("displaced {:?}, repeat {:?}", displaced, repeat),
    ));

    // Dead crystals are never offered
    if let Some(entry) = field.crystals.get_mut(&1) {
        entry.1 = false;
    }
    let found = claims.find_nearest_unclaimed(Point3::ZERO, 13, &field);
    results.push(TestResult::check(
        "dead_crystal_excluded",
        found == Some(3),
        format!("found {:?}", found),
    ));

    results.push(TestResult::check(
        "maps_consistent",
        claims.is_consistent(),
        format!("{:?}", claims),
    ));
    results
}

// ── 2. Claim race ───────────────────────────────────────────────────────

fn validate_claim_race() -> Vec<TestResult> {
    println!("--- Threaded Claim Race ---");
    let rounds = 200;
    let agents = 8;
    let mut bad_rounds = 0;

    for round in 0..rounds {
        let claims = Arc::new(ClaimCoordinator::<u32, u32>::new());
        claims.register_resource(round);
        let barrier = Arc::new(Barrier::new(agents));

        let handles: Vec<_> = (0..agents as u32)
            .map(|agent| {
                let claims = Arc::clone(&claims);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    claims.claim(round, agent).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|won| *won)
            .count();
        if winners != 1 {
            bad_rounds += 1;
        }
    }

    vec![TestResult::check(
        "exactly_one_winner_per_race",
        bad_rounds == 0,
        format!("{} of {} rounds had != 1 winner", bad_rounds, rounds),
    )]
}

// ── 3. Timed session ────────────────────────────────────────────────────

fn validate_session(config: &SessionConfig, seconds: f32, step: f32) -> Vec<TestResult> {
    println!("--- Timed Session ({:.0}s) ---", seconds);
    let mut engine = SessionEngine::new(config.clone());
    engine.populate();

    let ticks = (seconds / step.max(0.001)) as usize;
    let mut violations = 0;
    let mut peak_miners = 0;
    for _ in 0..ticks {
        engine.update(step);
        if !engine.claims_are_exclusive() {
            violations += 1;
        }
        peak_miners = peak_miners.max(engine.mining_pet_count());
    }

    let totals = engine.totals();
    info!(
        "Session done: {} gems, {} depleted, {} spawned, {} refused claims, {:?}",
        totals.gems_earned,
        totals.crystals_depleted,
        totals.crystals_spawned,
        totals.claims_refused,
        engine.claims().stats()
    );

    vec![
        TestResult::check(
            "session_claims_exclusive",
            violations == 0,
            format!("{} ticks with shared or unrecorded claims", violations),
        ),
        TestResult::check(
            "session_miners_bounded_by_crystals",
            peak_miners <= config.max_crystals,
            format!("peak {} miners, {} crystals", peak_miners, config.max_crystals),
        ),
        TestResult::check(
            "session_pets_earned_gems",
            config.pet_count == 0 || engine.total_gems() > 0,
            format!("{} gems", engine.total_gems()),
        ),
        TestResult::check(
            "session_gem_ledger_balanced",
            totals.gems_earned == engine.total_gems(),
            format!("earned {}, held {}", totals.gems_earned, engine.total_gems()),
        ),
        TestResult::check(
            "session_registry_matches_world",
            engine.claims().live_count() == engine.crystal_count(),
            format!(
                "{} registered, {} in world",
                engine.claims().live_count(),
                engine.crystal_count()
            ),
        ),
    ]
}
