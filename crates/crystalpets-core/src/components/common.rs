//! Components shared by crystals and pets.

use crystalpets_logic::geometry::Point3;
use serde::{Deserialize, Serialize};

/// World-space position. Pets update theirs every tick; crystals never move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Point3);

impl Position {
    pub fn flat(x: f32, z: f32) -> Self {
        Self(Point3::flat(x, z))
    }
}

/// Present only while an entity is walking somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub destination: Point3,
    /// Units per second
    pub speed: f32,
}

impl Movement {
    pub fn new(destination: Point3, speed: f32) -> Self {
        Self { destination, speed }
    }
}
