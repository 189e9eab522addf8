//! Movement system - walks entities with a Movement component

use hecs::World;

use crate::components::{Movement, Position};

/// Move entities toward their destinations, removing `Movement` on arrival.
pub fn movement_system(world: &mut World, delta_seconds: f32) {
    let mut arrived = Vec::new();

    for (entity, (pos, movement)) in world.query_mut::<(&mut Position, &Movement)>() {
        let step = movement.speed * delta_seconds;
        pos.0 = pos.0.move_towards(&movement.destination, step);
        if pos.0 == movement.destination {
            arrived.push(entity);
        }
    }

    for entity in arrived {
        let _ = world.remove_one::<Movement>(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystalpets_logic::geometry::Point3;

    #[test]
    fn test_moves_toward_destination() {
        let mut world = World::new();
        let walker = world.spawn((
            Position::flat(0.0, 0.0),
            Movement::new(Point3::flat(10.0, 0.0), 2.0),
        ));

        movement_system(&mut world, 1.0);

        let pos = world.get::<&Position>(walker).unwrap().0;
        assert!((pos.x - 2.0).abs() < 1e-5);
        assert!(world.get::<&Movement>(walker).is_ok());
    }

    #[test]
    fn test_arrival_removes_movement() {
        let mut world = World::new();
        let walker = world.spawn((
            Position::flat(0.0, 0.0),
            Movement::new(Point3::flat(1.0, 0.0), 5.0),
        ));

        movement_system(&mut world, 1.0);

        assert_eq!(world.get::<&Position>(walker).unwrap().0, Point3::flat(1.0, 0.0));
        assert!(world.get::<&Movement>(walker).is_err());
    }
}
