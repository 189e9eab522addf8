//! Component definitions for the ECS session.
//!
//! Components are pure data structs attached to entities.
//! Behavior lives in systems; the few methods here only guard their own
//! invariants (crystal health never goes negative, etc).

mod common;
mod crystal;
mod pet;

pub use common::*;
pub use crystal::*;
pub use pet::*;
