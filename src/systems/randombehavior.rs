//! Periodic random behavior.
//!
//! Runs on the behavior cadence. Each tick every free companion (not held,
//! not gliding, not frozen) draws a number and looks it up in one of two
//! tables:
//!
//! - climbers and crawlers roll `0..=500`: [`CLIMB_JUMP_ROLL`] leaps off to
//!   the ground along a timed arc, `0..=5` pauses on the wall for a few
//!   seconds;
//! - grounded companions roll `0..=2000` for idling, random picks, flips and
//!   walking.
//!
//! Most draws do nothing, which is what keeps the companion from twitching.

use std::ops::RangeInclusive;

use bevy_ecs::prelude::*;
use raylib::prelude::Vector2;

use crate::components::companion::{BehaviorState, Facing};
use crate::components::draggable::Dragged;
use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::tween::{Easing, TweenPosition, TweenPurpose};
use crate::resources::scheduler::{ScheduledTasks, TaskKind};
use crate::resources::worldbounds::WorldBounds;
use crate::systems::behavior::{
    BehaviorContext, BehaviorEnv, CompanionMut, FLIP_COOLDOWN, flip_and_invert,
    play_random_state, switch_state,
};

pub const CLIMB_ROLL_MAX: u32 = 500;
/// The one climb draw that leaps off the wall.
pub const CLIMB_JUMP_ROLL: u32 = 78;
pub const PAUSE_ROLLS: RangeInclusive<u32> = 0..=5;

pub const GROUND_ROLL_MAX: u32 = 2000;
pub const IDLE_ROLLS: RangeInclusive<u32> = 0..=5;
pub const RESTLESS_ROLLS: RangeInclusive<u32> = 777..=800;
pub const FLIP_ROLLS: RangeInclusive<u32> = 888..=890;
pub const RANDOM_ROLLS: RangeInclusive<u32> = 777..=780;
pub const WALK_ROLLS: RangeInclusive<u32> = 170..=175;

/// How far from the wall a leaping climber may land.
pub const JUMP_ARC_REACH: f32 = 500.0;
pub const JUMP_ARC_DURATION: f32 = 3.0;
/// Bounds, in seconds, of wall pauses and idle breaks.
pub const BREAK_MIN: f32 = 3.0;
pub const BREAK_MAX: f32 = 6.0;

/// Where a companion is and how big it is drawn.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub pos: Vector2,
    pub scale: Scale,
}

pub fn random_behavior_system(
    mut ctx: BehaviorContext,
    placements: Query<(Entity, &MapPosition, Option<&Scale>), (Without<Dragged>, Without<TweenPosition>)>,
    bounds: Res<WorldBounds>,
    mut tasks: ResMut<ScheduledTasks>,
    mut commands: Commands,
) {
    for (entity, position, scale) in placements.iter() {
        let placement = Placement {
            pos: position.pos,
            scale: scale.copied().unwrap_or_default(),
        };
        let arc = ctx.drive(entity, |target, env| {
            roll_companion(target, env, placement, &bounds, &mut tasks)
        });
        if let Some(Some(tween)) = arc {
            commands.entity(entity).insert(tween);
        }
    }
}

/// Draw for one companion and apply the matching table.
///
/// Returns the jump arc to start, if the draw launched one.
pub fn roll_companion(
    target: &mut CompanionMut,
    env: &mut BehaviorEnv,
    placement: Placement,
    bounds: &WorldBounds,
    tasks: &mut ScheduledTasks,
) -> Option<TweenPosition> {
    if target.body.frozen {
        return None;
    }
    match target.companion.state {
        Some(state) if state.is_climbing() => {
            let draw = env.rng.roll(0, CLIMB_ROLL_MAX);
            apply_climb_roll(target, env, draw, placement, bounds, tasks)
        }
        Some(BehaviorState::Drag) | Some(BehaviorState::Jump) | None => None,
        Some(_) if target.body.contact.down => {
            let draw = env.rng.roll(0, GROUND_ROLL_MAX);
            apply_ground_roll(target, env, draw, tasks);
            None
        }
        Some(_) => None,
    }
}

/// Climb/crawl table.
pub fn apply_climb_roll(
    target: &mut CompanionMut,
    env: &mut BehaviorEnv,
    draw: u32,
    placement: Placement,
    bounds: &WorldBounds,
    tasks: &mut ScheduledTasks,
) -> Option<TweenPosition> {
    if draw == CLIMB_JUMP_ROLL {
        return launch_jump_arc(target, env, placement, bounds);
    }
    if PAUSE_ROLLS.contains(&draw) {
        let Some(state) = target.companion.state else {
            return None;
        };
        target.body.freeze();
        target.animation.pause();
        let resume_at = env.now + env.rng.between(BREAK_MIN, BREAK_MAX);
        tasks.schedule(target.entity, resume_at, TaskKind::ResumeFromPause { state });
    }
    None
}

/// Leave the wall or ceiling along a timed arc that ends on the ground.
fn launch_jump_arc(
    target: &mut CompanionMut,
    env: &mut BehaviorEnv,
    placement: Placement,
    bounds: &WorldBounds,
) -> Option<TweenPosition> {
    if !target.companion.supports(BehaviorState::Jump) {
        return None;
    }
    let from = placement.pos;
    let x = if target.companion.is_in(BehaviorState::Climb) {
        match target.companion.facing {
            Facing::Left => env.rng.between(from.x, from.x.max(JUMP_ARC_REACH)),
            Facing::Right => {
                let near = (bounds.width - JUMP_ARC_REACH).min(from.x);
                env.rng.between(near, from.x)
            }
        }
    } else {
        from.x
    };
    let (before, after) = target.sprite.extents(&placement.scale);
    let to = bounds.clamp_pivot(
        Vector2 {
            x,
            y: bounds.ground_y(after),
        },
        before,
        after,
    );

    if !switch_state(target, env, BehaviorState::Jump) {
        return None;
    }
    target.body.freeze();
    target.body.collide_world_bounds = false;
    target.body.set_velocity(Vector2 { x: 0.0, y: 0.0 });
    Some(TweenPosition::new(from, to, JUMP_ARC_DURATION, TweenPurpose::JumpArc).with_easing(Easing::QuadOut))
}

/// Ground table.
pub fn apply_ground_roll(
    target: &mut CompanionMut,
    env: &mut BehaviorEnv,
    draw: u32,
    tasks: &mut ScheduledTasks,
) {
    let walking = target.companion.is_in(BehaviorState::Walk);
    if walking && IDLE_ROLLS.contains(&draw) {
        if switch_state(target, env, BehaviorState::Idle) {
            let resume_at = env.now + env.rng.between(BREAK_MIN, BREAK_MAX);
            tasks.schedule(target.entity, resume_at, TaskKind::ResumeWalk);
        }
    } else if !walking && RESTLESS_ROLLS.contains(&draw) {
        play_random_state(target, env);
    } else if FLIP_ROLLS.contains(&draw) {
        if target.companion.can_random_flip(env.now) {
            flip_and_invert(target);
            target.companion.flip_ready_at = env.now + FLIP_COOLDOWN;
        }
    } else if RANDOM_ROLLS.contains(&draw) {
        play_random_state(target, env);
    } else if WALK_ROLLS.contains(&draw) {
        switch_state(target, env, BehaviorState::Walk);
    }
}
