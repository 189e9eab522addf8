//! Pure mining logic for CrystalPets.
//!
//! This crate contains the game rules that are independent of any ECS,
//! renderer, or runtime. Functions take plain data and return results, making
//! them unit-testable and usable from the session engine, the headless
//! harness, and benchmarks alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`claims`] | Resource claim coordinator: one pet per crystal, nearest-unclaimed queries |
//! | [`config`] | Session configuration loaded from JSON |
//! | [`geometry`] | 3D points and horizontal-plane distances |
//! | [`mining`] | Pet behavior phases, scan/hit timers, mining range |
//! | [`status`] | Bounded-staleness polled flags (crystal shake) |

pub mod claims;
pub mod config;
pub mod geometry;
pub mod mining;
pub mod status;

pub use claims::{ClaimCoordinator, ClaimError, ClaimStats, ResourceView};
pub use config::{ConfigError, SessionConfig};
pub use geometry::Point3;
pub use mining::{MiningRules, PetPhase};
pub use status::PolledFlag;
