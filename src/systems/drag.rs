//! Pointer dragging of companions.
//!
//! [`pointer_drag_system`] turns the per-frame [`PointerState`] into drag
//! events: a press over an opaque companion pixel grabs it, every held frame
//! triggers a [`DragEvent`], and letting go triggers a [`DragEndEvent`].
//!
//! The observers implement what a drag does to a companion. While held it
//! follows the pointer in the drag state with physics frozen; on release it
//! is thrown along the pointer's velocity and glides to a stop, after which
//! the tween observer hands it back to the behavior controller.

use bevy_ecs::prelude::*;
use log::debug;
use raylib::prelude::Vector2;

use crate::components::companion::{BehaviorState, Facing};
use crate::components::draggable::{Draggable, Dragged};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::components::tween::{Easing, TweenPosition, TweenPurpose};
use crate::events::drag::{DragEndEvent, DragEvent};
use crate::resources::pointer::PointerState;
use crate::resources::sheetstore::SheetStore;
use crate::resources::worldbounds::WorldBounds;
use crate::systems::behavior::{BehaviorContext, set_facing, switch_state};
use crate::systems::hittest::hit_test;

/// Seconds between the end of the release glide and the resume decision.
pub const RELEASE_SETTLE_DELAY: f32 = 0.05;
/// Duration of the release glide.
pub const RELEASE_GLIDE_DURATION: f32 = 0.6;
/// Release velocity (pixels per frame) to throw distance factor.
pub const THROW_FACTOR: f32 = 9.9;

/// Grab, hold and release companions with the pointer.
pub fn pointer_drag_system(
    pointer: Res<PointerState>,
    sheets: Res<SheetStore>,
    draggable: Query<(Entity, &MapPosition, &Sprite, Option<&Scale>), With<Draggable>>,
    held: Query<(Entity, &Dragged)>,
    mut commands: Commands,
) {
    if held.is_empty() {
        if !pointer.pressed {
            return;
        }
        let Some(entity) = hit_test(pointer.position, draggable.iter(), &sheets) else {
            return;
        };
        let Ok((_, position, _, _)) = draggable.get(entity) else {
            return;
        };
        debug!("Grabbed {:?}", entity);
        commands
            .entity(entity)
            .insert(Dragged::new(position.pos, pointer.position));
        commands.trigger(DragEvent {
            entity,
            position: position.pos,
        });
        return;
    }

    for (entity, dragged) in held.iter() {
        if pointer.down {
            commands.trigger(DragEvent {
                entity,
                position: dragged.target_for(pointer.position),
            });
        } else {
            debug!("Released {:?}", entity);
            commands.entity(entity).remove::<Dragged>();
            commands.trigger(DragEndEvent {
                entity,
                velocity: pointer.velocity,
            });
        }
    }
}

/// Move a held companion and keep it in the drag state.
pub fn drag_observer(
    trigger: On<DragEvent>,
    mut ctx: BehaviorContext,
    mut positions: Query<(&mut MapPosition, &Dragged)>,
    tweens: Query<(), With<TweenPosition>>,
    mut commands: Commands,
) {
    let event = *trigger.event();
    let Ok((mut position, dragged)) = positions.get_mut(event.entity) else {
        return;
    };
    if tweens.contains(event.entity) {
        commands.entity(event.entity).remove::<TweenPosition>();
    }
    position.pos = event.position;
    let start_x = dragged.start.x;

    ctx.drive(event.entity, |target, env| {
        switch_state(target, env, BehaviorState::Drag);
        target.body.freeze();
        target.body.collide_world_bounds = false;
        target.body.set_velocity(Vector2 { x: 0.0, y: 0.0 });
        if event.position.x > start_x {
            set_facing(target, Facing::Right);
        } else if event.position.x < start_x {
            set_facing(target, Facing::Left);
        }
    });
}

/// Throw a released companion along the pointer velocity.
pub fn drag_end_observer(
    trigger: On<DragEndEvent>,
    mut bodies: Query<(&MapPosition, &mut RigidBody, &Sprite, Option<&Scale>)>,
    bounds: Res<WorldBounds>,
    mut commands: Commands,
) {
    let event = *trigger.event();
    let Ok((position, mut body, sprite, scale)) = bodies.get_mut(event.entity) else {
        return;
    };
    let scale = scale.copied().unwrap_or_default();
    let (before, after) = sprite.extents(&scale);
    let from = position.pos;
    let thrown = from + event.velocity.scale_by(THROW_FACTOR);
    let to = bounds.clamp_pivot(thrown, before, after);

    body.freeze();
    body.collide_world_bounds = false;
    commands.entity(event.entity).insert(
        TweenPosition::new(from, to, RELEASE_GLIDE_DURATION, TweenPurpose::DragRelease)
            .with_easing(Easing::QuartOut),
    );
}
