//! Read-only view of crystals for the claim coordinator.

use crystalpets_logic::claims::ResourceView;
use crystalpets_logic::geometry::Point3;
use hecs::{Entity, World};

use crate::components::{Crystal, Position};

/// Lets the coordinator ask a [`World`] whether a crystal is alive and where
/// it is. Entities without a [`Crystal`] count as dead.
#[derive(Clone, Copy)]
pub struct WorldView<'a>(pub &'a World);

impl ResourceView<Entity> for WorldView<'_> {
    fn is_alive(&self, resource: Entity) -> bool {
        self.0
            .get::<&Crystal>(resource)
            .map(|crystal| crystal.is_alive())
            .unwrap_or(false)
    }

    fn position(&self, resource: Entity) -> Option<Point3> {
        self.0.get::<&Position>(resource).ok().map(|pos| pos.0)
    }
}
