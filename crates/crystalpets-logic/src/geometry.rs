//! Points and distances.
//!
//! Pets navigate on flat ground, so every distance used for targeting is
//! measured in the horizontal `x`/`z` plane. `y` is up and only carried
//! along for rendering.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// A ground-level point (`y == 0`).
    pub fn flat(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    pub fn planar_distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    pub fn planar_distance(&self, other: &Self) -> f32 {
        self.planar_distance_squared(other).sqrt()
    }

    /// Step toward `target` in the horizontal plane by at most `max_step`.
    ///
    /// Height is snapped to the target's. Returns `target` exactly once it
    /// is within reach.
    pub fn move_towards(&self, target: &Self, max_step: f32) -> Self {
        let distance = self.planar_distance(target);
        if distance <= max_step || distance <= f32::EPSILON {
            return *target;
        }
        let t = max_step / distance;
        Self {
            x: self.x + (target.x - self.x) * t,
            y: target.y,
            z: self.z + (target.z - self.z) * t,
        }
    }
}
