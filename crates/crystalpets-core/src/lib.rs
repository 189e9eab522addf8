//! CrystalPets Core - Crystal Mining Session Engine
//!
//! An ECS-based simulation of pets mining crystals in a small arena. Pets
//! scan for the nearest free crystal, claim it through a shared
//! [`ClaimCoordinator`](crystalpets_logic::claims::ClaimCoordinator), walk
//! over and mine it for gems until it is depleted and respawned elsewhere.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Crystals and pets
//! - **Components**: Pure data attached to entities (Position, Crystal, Miner, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! The coordinator is owned by the engine and passed to systems explicitly;
//! there is no global claim state.
//!
//! # Example
//!
//! ```rust,no_run
//! use crystalpets_core::prelude::*;
//! use crystalpets_logic::config::SessionConfig;
//!
//! let mut engine = SessionEngine::new(SessionConfig::default());
//! engine.populate();
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod engine;
pub mod persistence;
pub mod systems;
pub mod view;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{SessionEngine, SessionTotals};
    pub use crate::systems::Claims;
    pub use crate::view::WorldView;
}
