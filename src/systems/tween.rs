//! Position tween system.
//!
//! [`tween_mapposition_system`] moves entities with a [`TweenPosition`] along
//! the eased path between `from` and `to`. When the tween reaches its end the
//! component is removed and a [`TweenFinishedEvent`] is triggered with the
//! tween's purpose.

use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::tween::{Easing, TweenPosition, TweenPurpose};
use crate::events::tween::TweenFinishedEvent;
use crate::resources::scheduler::{ScheduledTasks, TaskKind};
use crate::resources::worldbounds::WorldBounds;
use crate::resources::worldtime::WorldTime;
use crate::systems::behavior::{BehaviorContext, after_jump};
use crate::systems::drag::RELEASE_SETTLE_DELAY;
use bevy_ecs::prelude::*;
use raylib::math::Vector2;

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub(crate) fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuartOut => {
            let p = t - 1.0;
            1.0 - p * p * p * p
        }
    }
}

/// Linearly interpolate between two 2D vectors.
pub(crate) fn lerp_v2(a: Vector2, b: Vector2, t: f32) -> Vector2 {
    Vector2 {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Animate entity positions based on [`TweenPosition`] components.
pub fn tween_mapposition_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut MapPosition, &mut TweenPosition)>,
    mut commands: Commands,
) {
    let dt = world_time.delta.max(0.0);
    for (entity, mut mp, mut tw) in query.iter_mut() {
        if !tw.playing {
            continue;
        }
        tw.time = (tw.time + dt).min(tw.duration);
        let t = if tw.duration > 0.0 {
            tw.time / tw.duration
        } else {
            1.0
        };
        mp.pos = lerp_v2(tw.from, tw.to, ease(tw.easing, t));

        if tw.time >= tw.duration {
            tw.playing = false;
            commands.entity(entity).remove::<TweenPosition>();
            commands.trigger(TweenFinishedEvent {
                entity,
                purpose: tw.purpose,
            });
        }
    }
}

/// A companion arrived at the end of a glide or jump arc.
///
/// The body is unfrozen with its contact set to the edges it rests against,
/// so those edges do not count as newly touched. A released companion decides
/// what to do shortly after; a jump arc lands right away.
pub fn tween_finished_observer(
    trigger: On<TweenFinishedEvent>,
    mut ctx: BehaviorContext,
    positions: Query<(&MapPosition, Option<&Scale>)>,
    bounds: Res<WorldBounds>,
    mut tasks: ResMut<ScheduledTasks>,
) {
    let event = *trigger.event();
    let Ok((position, scale)) = positions.get(event.entity) else {
        return;
    };
    let pos = position.pos;
    let scale = scale.copied().unwrap_or_default();
    let now = ctx.now();

    ctx.drive(event.entity, |target, env| {
        let (before, after) = target.sprite.extents(&scale);
        target.body.unfreeze();
        target.body.collide_world_bounds = true;
        target.body.contact = bounds.touching(pos, before, after);
        match event.purpose {
            TweenPurpose::DragRelease => {
                tasks.schedule(
                    event.entity,
                    now + RELEASE_SETTLE_DELAY,
                    TaskKind::ResumeAfterRelease,
                );
            }
            TweenPurpose::JumpArc => {
                after_jump(target, env);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tween::TweenPurpose;

    #[test]
    fn easing_endpoints() {
        for e in [Easing::QuadOut, Easing::QuartOut] {
            assert_eq!(ease(e, 0.0), 0.0);
            assert!((ease(e, 1.0) - 1.0).abs() < 1e-6);
        }
        assert!(ease(Easing::QuartOut, 0.5) > ease(Easing::QuadOut, 0.5));
        assert_eq!(ease(Easing::QuadOut, 2.0), 1.0);
    }

    #[derive(Resource, Default)]
    struct Finished(Vec<TweenPurpose>);

    #[test]
    fn tween_reaches_target_and_removes_itself() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.25,
            ..WorldTime::default()
        });
        world.insert_resource(Finished::default());
        world.add_observer(|trigger: On<TweenFinishedEvent>, mut f: ResMut<Finished>| {
            f.0.push(trigger.event().purpose);
        });
        let e = world
            .spawn((
                MapPosition::new(0.0, 0.0),
                TweenPosition::new(
                    Vector2 { x: 0.0, y: 0.0 },
                    Vector2 { x: 100.0, y: 50.0 },
                    0.5,
                    TweenPurpose::DragRelease,
                ),
            ))
            .id();
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(tween_mapposition_system);
        schedule.run(&mut world);
        let p = world.get::<MapPosition>(e).unwrap().pos;
        assert_eq!((p.x, p.y), (75.0, 37.5));
        assert!(world.resource::<Finished>().0.is_empty());

        schedule.run(&mut world);
        let p = world.get::<MapPosition>(e).unwrap().pos;
        assert_eq!((p.x, p.y), (100.0, 50.0));
        assert!(world.get::<TweenPosition>(e).is_none());
        assert_eq!(world.resource::<Finished>().0, vec![TweenPurpose::DragRelease]);
    }
}
