//! Runs due [`ScheduledTasks`].
//!
//! Tasks never get cancelled. Instead each one re-checks the companion when it
//! fires and does nothing if the situation it was scheduled for is gone: the
//! companion is being dragged or is still gliding, it left the state the task
//! expects, or something else already woke it up.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::companion::{BehaviorState, Direction, Facing};
use crate::components::draggable::Dragged;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::BoundsContact;
use crate::components::scale::Scale;
use crate::components::tween::TweenPosition;
use crate::resources::scheduler::{ScheduledTasks, TaskKind};
use crate::resources::worldbounds::WorldBounds;
use crate::systems::behavior::{
    BehaviorContext, BehaviorEnv, CompanionMut, boundary_climb, crawl_direction, jump_or_random,
    switch_state, update_movement,
};

pub fn run_scheduled_tasks(
    mut ctx: BehaviorContext,
    mut tasks: ResMut<ScheduledTasks>,
    placements: Query<(&MapPosition, Option<&Scale>, Has<Dragged>, Has<TweenPosition>)>,
    bounds: Res<WorldBounds>,
) {
    let due = tasks.drain_due(ctx.now());
    for task in due {
        let Ok((position, scale, dragged, tweening)) = placements.get(task.entity) else {
            continue;
        };
        if dragged || tweening {
            debug!("Dropping stale {:?} for {:?}", task.kind, task.entity);
            continue;
        }
        let pos = position.pos;
        let scale = scale.copied().unwrap_or_default();
        ctx.drive(task.entity, |target, env| {
            let (before, after) = target.sprite.extents(&scale);
            let walls = bounds.touching(pos, before, after);
            run_task(target, env, task.kind, walls)
        });
    }
}

/// Carry out one task. `walls` are the world edges the companion touches now.
/// Returns false when the task was stale.
pub fn run_task(
    target: &mut CompanionMut,
    env: &mut BehaviorEnv,
    kind: TaskKind,
    walls: BoundsContact,
) -> bool {
    match kind {
        TaskKind::ResumeWalk => {
            if !target.companion.is_in(BehaviorState::Idle) {
                return false;
            }
            switch_state(target, env, BehaviorState::Walk)
        }
        TaskKind::ResumeFromPause { state } => {
            if !target.companion.is_in(state) || !target.body.frozen || !target.animation.paused {
                return false;
            }
            resume_climbing(target, state);
            true
        }
        TaskKind::ResumeAfterRelease => {
            match target.companion.state {
                Some(state) if state.is_climbing() => resume_climbing(target, state),
                _ => {
                    jump_or_random(target, env);
                }
            }
            if walls.left || walls.right {
                let side = if walls.left { Facing::Left } else { Facing::Right };
                boundary_climb(target, env, side);
            }
            true
        }
    }
}

fn resume_climbing(target: &mut CompanionMut, state: BehaviorState) {
    target.body.unfreeze();
    target.animation.resume();
    let direction = if state == BehaviorState::Climb {
        Direction::Up
    } else {
        crawl_direction(target.companion.facing)
    };
    update_movement(target, direction);
}
