//! Companion state machine.
//!
//! Every trigger (spawn, world bounds, drag, the periodic roll, scheduled
//! tasks) funnels into the functions of this module, which keep three things
//! consistent:
//!
//! - a companion only ever enters a state its sprite provides a clip for,
//! - gravity is on exactly when the companion is not moving upwards,
//! - the sprite is mirrored exactly when the companion faces left.
//!
//! The functions work on a [`CompanionMut`] view (borrowed components of one
//! entity) and a [`BehaviorEnv`] (the shared resources a transition reads), so
//! systems and observers with different queries can all drive them.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use log::{debug, error};
use raylib::prelude::Vector2;

use crate::components::animation::Animation;
use crate::components::companion::{BehaviorState, Companion, Direction, Facing};
use crate::components::rigidbody::{BoundsContact, RigidBody};
use crate::components::sprite::Sprite;
use crate::resources::animationstore::AnimationStore;
use crate::resources::companionconfig::CompanionConfig;
use crate::resources::rng::BehaviorRng;
use crate::resources::worldtime::WorldTime;

/// Walking and climbing speed in pixels per second.
pub const MOVE_VELOCITY: f32 = 54.0;
/// Extra downward acceleration while heading down.
pub const MOVE_ACCELERATION: f32 = 108.0;
/// Seconds between two random state picks of one companion.
pub const RANDOM_STATE_COOLDOWN: f32 = 6.0;
/// Seconds between two random flips of one companion.
pub const FLIP_COOLDOWN: f32 = 10.0;

/// Query data for the components a transition mutates.
pub type CompanionParts = (
    &'static mut Companion,
    &'static mut RigidBody,
    &'static mut Sprite,
    &'static mut Animation,
);

/// Mutable view of one companion's behavior-relevant components.
pub struct CompanionMut<'a> {
    pub entity: Entity,
    pub companion: &'a mut Companion,
    pub body: &'a mut RigidBody,
    pub sprite: &'a mut Sprite,
    pub animation: &'a mut Animation,
}

impl<'a> CompanionMut<'a> {
    pub fn from_parts(
        entity: Entity,
        parts: (
            Mut<'a, Companion>,
            Mut<'a, RigidBody>,
            Mut<'a, Sprite>,
            Mut<'a, Animation>,
        ),
    ) -> Self {
        let (companion, body, sprite, animation) = parts;
        Self {
            entity,
            companion: companion.into_inner(),
            body: body.into_inner(),
            sprite: sprite.into_inner(),
            animation: animation.into_inner(),
        }
    }
}

/// Shared inputs of a transition.
pub struct BehaviorEnv<'a> {
    /// World clock, the time base of cooldowns.
    pub now: f32,
    pub allow_climbing: bool,
    pub clips: &'a AnimationStore,
    pub rng: &'a mut BehaviorRng,
}

/// System parameters needed to drive transitions from a system or observer.
#[derive(SystemParam)]
pub struct BehaviorContext<'w, 's> {
    pub companions: Query<'w, 's, CompanionParts>,
    pub clips: Res<'w, AnimationStore>,
    pub config: Res<'w, CompanionConfig>,
    pub time: Res<'w, WorldTime>,
    pub rng: ResMut<'w, BehaviorRng>,
}

impl BehaviorContext<'_, '_> {
    pub fn now(&self) -> f32 {
        self.time.elapsed
    }

    /// Run `f` on one companion. Returns `None` when `entity` is not a
    /// companion.
    pub fn drive<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut CompanionMut, &mut BehaviorEnv) -> R,
    ) -> Option<R> {
        let parts = self.companions.get_mut(entity).ok()?;
        let mut target = CompanionMut::from_parts(entity, parts);
        let mut env = BehaviorEnv {
            now: self.time.elapsed,
            allow_climbing: self.config.allow_climbing,
            clips: &self.clips,
            rng: &mut self.rng,
        };
        Some(f(&mut target, &mut env))
    }
}

pub fn set_facing(target: &mut CompanionMut, facing: Facing) {
    target.companion.facing = facing;
    target.sprite.flip_h = facing == Facing::Left;
}

/// Apply a movement direction to the body.
///
/// Heading down re-arms the ground contact so that a landing is reported even
/// when the body starts on the ground.
pub fn update_movement(target: &mut CompanionMut, direction: Direction) {
    let v = MOVE_VELOCITY;
    let (velocity, acceleration, facing) = match direction {
        Direction::Right => ((v, 0.0), 0.0, Some(Facing::Right)),
        Direction::Left => ((-v, 0.0), 0.0, Some(Facing::Left)),
        Direction::Up => ((0.0, -v), 0.0, None),
        Direction::Down => ((0.0, v), MOVE_ACCELERATION, None),
        Direction::UpsideLeft => ((-v, -v), 0.0, Some(Facing::Left)),
        Direction::UpsideRight => ((v, -v), 0.0, Some(Facing::Right)),
        Direction::Unknown => ((0.0, 0.0), 0.0, None),
    };

    target.companion.direction = direction;
    target.body.set_velocity(Vector2 {
        x: velocity.0,
        y: velocity.1,
    });
    target.body.set_acceleration(Vector2 {
        x: 0.0,
        y: acceleration,
    });
    target.body.set_gravity_enabled(!direction.is_moving_up());
    if direction == Direction::Down {
        target.body.contact.down = false;
    }
    if let Some(facing) = facing {
        set_facing(target, facing);
    }
}

/// Direction a companion takes on entering its current state.
pub fn update_direction(target: &mut CompanionMut) {
    let direction = match target.companion.state {
        Some(BehaviorState::Walk) => match target.companion.facing {
            Facing::Left => Direction::Left,
            Facing::Right => Direction::Right,
        },
        Some(BehaviorState::Jump) => {
            let flipped = target.companion.facing.flipped();
            set_facing(target, flipped);
            Direction::Down
        }
        Some(BehaviorState::Climb) => Direction::Up,
        // crawl away from the wall it climbed
        Some(BehaviorState::Crawl) => match target.companion.facing {
            Facing::Right => Direction::UpsideLeft,
            Facing::Left => Direction::UpsideRight,
        },
        _ => Direction::Unknown,
    };
    update_movement(target, direction);
}

/// Direction that continues a crawl in the way the companion is looking.
pub fn crawl_direction(facing: Facing) -> Direction {
    match facing {
        Facing::Left => Direction::UpsideLeft,
        Facing::Right => Direction::UpsideRight,
    }
}

/// Enter `state`, playing its clip `repeat` extra times (`None` loops).
///
/// Returns `Ok(false)` for commands that do not apply: the state is not
/// provided, already active, or a climbing state while climbing is disabled.
/// A missing clip is a fault and returned as `Err`.
pub fn try_switch_state(
    target: &mut CompanionMut,
    env: &BehaviorEnv,
    state: BehaviorState,
    repeat: Option<u32>,
) -> Result<bool, String> {
    if state.is_climbing() && !env.allow_climbing {
        return Ok(false);
    }
    if target.companion.is_in(state) || !target.companion.supports(state) {
        return Ok(false);
    }
    let key = target.companion.clip_key(state);
    if !env.clips.contains(&key) {
        return Err(format!(
            "No clip '{}' for companion '{}'",
            key, target.companion.id
        ));
    }

    let leaving_fall = target.companion.is_in(BehaviorState::Fall);
    target.companion.state = Some(state);
    target.animation.play(key, repeat);
    if state == BehaviorState::Fall {
        // random picks wait for the fall to complete
        target.companion.random_state_ready_at = f32::INFINITY;
    } else if leaving_fall && target.companion.random_state_ready_at.is_infinite() {
        target.companion.random_state_ready_at = env.now;
    }
    update_direction(target);

    debug!(
        "Companion '{}' -> {} ({:?})",
        target.companion.id, state, target.companion.direction
    );
    Ok(true)
}

/// Enter `state` looping. Faults are logged and reported as `false`.
pub fn switch_state(target: &mut CompanionMut, env: &BehaviorEnv, state: BehaviorState) -> bool {
    switch_state_with(target, env, state, None)
}

pub fn switch_state_with(
    target: &mut CompanionMut,
    env: &BehaviorEnv,
    state: BehaviorState,
    repeat: Option<u32>,
) -> bool {
    match try_switch_state(target, env, state, repeat) {
        Ok(switched) => switched,
        Err(e) => {
            error!("Failed to switch state: {}", e);
            false
        }
    }
}

/// Uniform pick among the companion's states that random picks may choose.
pub fn pick_random_state(companion: &Companion, rng: &mut BehaviorRng) -> Option<BehaviorState> {
    let candidates: ArrayVec<BehaviorState, 10> = companion
        .available_states
        .iter()
        .copied()
        .filter(|s| !s.is_forbidden_random())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.index(candidates.len())])
}

/// Cooldown-gated random pick.
///
/// Returns whether a pick fired. The cooldown starts whenever one does, even
/// if the picked state was already active.
pub fn play_random_state(target: &mut CompanionMut, env: &mut BehaviorEnv) -> bool {
    if !target.companion.can_play_random_state(env.now) {
        return false;
    }
    let Some(state) = pick_random_state(target.companion, env.rng) else {
        return false;
    };
    switch_state(target, env, state);
    target.companion.random_state_ready_at = env.now + RANDOM_STATE_COOLDOWN;
    true
}

/// Jump when the sprite can, otherwise switch to a random state right away.
pub fn jump_or_random(target: &mut CompanionMut, env: &mut BehaviorEnv) -> bool {
    if target.companion.supports(BehaviorState::Jump) {
        return switch_state(target, env, BehaviorState::Jump);
    }
    match pick_random_state(target.companion, env.rng) {
        Some(state) => switch_state(target, env, state),
        None => false,
    }
}

/// Landing from a jump: fall once if possible, otherwise pick at once.
pub fn after_jump(target: &mut CompanionMut, env: &mut BehaviorEnv) -> bool {
    if !target.companion.is_in(BehaviorState::Jump) {
        return false;
    }
    if target.companion.supports(BehaviorState::Fall)
        && switch_state_with(target, env, BehaviorState::Fall, Some(0))
    {
        return true;
    }
    target.companion.random_state_ready_at = env.now;
    play_random_state(target, env)
}

/// The fall clip finished: lift the lock and pick a state.
pub fn finish_fall(target: &mut CompanionMut, env: &mut BehaviorEnv) -> bool {
    if !target.companion.is_in(BehaviorState::Fall) {
        return false;
    }
    target.companion.random_state_ready_at = env.now;
    play_random_state(target, env)
}

/// Touching a side wall: climb it when allowed.
pub fn boundary_climb(target: &mut CompanionMut, env: &BehaviorEnv, side: Facing) -> bool {
    if target.companion.state.is_some_and(BehaviorState::is_climbing) {
        return false;
    }
    if !env.allow_climbing || !target.companion.supports(BehaviorState::Climb) {
        return false;
    }
    set_facing(target, side);
    switch_state(target, env, BehaviorState::Climb)
}

/// Flip facing and mirror any horizontal movement.
pub fn flip_and_invert(target: &mut CompanionMut) {
    let flipped = target.companion.facing.flipped();
    set_facing(target, flipped);
    let inverted = match target.companion.direction {
        Direction::Right => Some(Direction::Left),
        Direction::Left => Some(Direction::Right),
        Direction::UpsideLeft => Some(Direction::UpsideRight),
        Direction::UpsideRight => Some(Direction::UpsideLeft),
        _ => None,
    };
    if let Some(direction) = inverted {
        update_movement(target, direction);
    }
}

/// React to the world edges a companion just touched.
pub fn react_to_world_bounds(target: &mut CompanionMut, env: &mut BehaviorEnv, sides: BoundsContact) {
    let sideways = sides.left || sides.right;

    if target.companion.is_in(BehaviorState::Crawl) {
        if sideways {
            jump_or_random(target, env);
        }
        return;
    }

    if sides.up {
        if !env.allow_climbing {
            jump_or_random(target, env);
            return;
        }
        if target.companion.supports(BehaviorState::Crawl) {
            switch_state(target, env, BehaviorState::Crawl);
            return;
        }
        jump_or_random(target, env);
    } else if sides.down {
        if target.companion.is_in(BehaviorState::Jump) {
            after_jump(target, env);
        } else {
            play_random_state(target, env);
        }
    }

    if sideways {
        let side = if sides.left { Facing::Left } else { Facing::Right };
        if env.allow_climbing {
            boundary_climb(target, env, side);
        } else if !sides.down {
            jump_or_random(target, env);
        }
    }
}
