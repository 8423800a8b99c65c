//! World-bounds detection.
//!
//! Keeps every non-frozen body inside [`WorldBounds`], stops velocity that
//! points into a touched edge, and triggers a
//! [`WorldBoundsEvent`](crate::events::worldbounds::WorldBoundsEvent) for the
//! edges a body touches this frame but did not touch last frame.
//!
//! Frozen bodies keep their recorded contact untouched, so a paused climber
//! does not re-enter its wall when it resumes.

use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::events::worldbounds::WorldBoundsEvent;
use crate::resources::worldbounds::WorldBounds;
use crate::systems::behavior::{BehaviorContext, react_to_world_bounds};

pub fn world_bounds_system(
    mut query: Query<(
        Entity,
        &mut MapPosition,
        &mut RigidBody,
        &Sprite,
        Option<&Scale>,
    )>,
    bounds: Res<WorldBounds>,
    mut commands: Commands,
) {
    for (entity, mut position, mut body, sprite, scale) in query.iter_mut() {
        if !body.collides_with_world_bounds() {
            continue;
        }
        let scale = scale.copied().unwrap_or_default();
        let (before, after) = sprite.extents(&scale);

        let clamped = bounds.clamp_pivot(position.pos, before, after);
        if clamped.x != position.pos.x || clamped.y != position.pos.y {
            position.pos = clamped;
        }
        let contact = bounds.touching(clamped, before, after);

        if (contact.left && body.velocity.x < 0.0) || (contact.right && body.velocity.x > 0.0) {
            body.velocity.x = 0.0;
        }
        if (contact.up && body.velocity.y < 0.0) || (contact.down && body.velocity.y > 0.0) {
            body.velocity.y = 0.0;
        }

        let entered = contact.entered_since(body.contact);
        if body.contact != contact {
            body.contact = contact;
        }
        if entered.any() {
            commands.trigger(WorldBoundsEvent {
                entity,
                sides: entered,
            });
        }
    }
}

/// Drive the companion state machine from world-edge contact.
pub fn world_bounds_observer(trigger: On<WorldBoundsEvent>, mut ctx: BehaviorContext) {
    let event = *trigger.event();
    ctx.drive(event.entity, |target, env| {
        react_to_world_bounds(target, env, event.sides)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::rigidbody::BoundsContact;
    use raylib::prelude::Vector2;

    #[derive(Resource, Default)]
    struct Seen(Vec<BoundsContact>);

    fn setup(pos: Vector2, velocity: Vector2) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(WorldBounds::new(200.0, 100.0));
        world.insert_resource(Seen::default());
        world.add_observer(|trigger: On<WorldBoundsEvent>, mut seen: ResMut<Seen>| {
            seen.0.push(trigger.event().sides);
        });
        let mut body = RigidBody::new();
        body.velocity = velocity;
        let e = world
            .spawn((
                MapPosition { pos },
                body,
                Sprite::new("cat", 20.0, 20.0, 1),
                Scale::uniform(1.0),
            ))
            .id();
        world.flush();
        (world, e)
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(world_bounds_system);
        schedule.run(world);
    }

    #[test]
    fn clamps_and_reports_new_edges_once() {
        let (mut world, e) = setup(Vector2 { x: 5.0, y: 95.0 }, Vector2 { x: -10.0, y: 10.0 });
        run(&mut world);
        let p = world.get::<MapPosition>(e).unwrap().pos;
        assert_eq!((p.x, p.y), (10.0, 90.0));
        let body = world.get::<RigidBody>(e).unwrap();
        assert_eq!((body.velocity.x, body.velocity.y), (0.0, 0.0));
        {
            let seen = &world.resource::<Seen>().0;
            assert_eq!(seen.len(), 1);
            assert!(seen[0].left && seen[0].down && !seen[0].right);
        }

        run(&mut world);
        assert_eq!(world.resource::<Seen>().0.len(), 1);
    }

    #[test]
    fn frozen_and_non_colliding_bodies_are_ignored() {
        let (mut world, e) = setup(Vector2 { x: -50.0, y: 50.0 }, Vector2 { x: 0.0, y: 0.0 });
        world.get_mut::<RigidBody>(e).unwrap().freeze();
        run(&mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos.x, -50.0);

        {
            let mut body = world.get_mut::<RigidBody>(e).unwrap();
            body.unfreeze();
            body.collide_world_bounds = false;
        }
        run(&mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos.x, -50.0);
        assert!(world.resource::<Seen>().0.is_empty());
    }
}
