//! Behavior record for a spawned companion.
//!
//! A [`Companion`] is the authoritative behavior state of one on-screen pet:
//! which behavior it is playing, which way it is moving and facing, which
//! behaviors its sprite sheet supports, and when its randomized behaviors may
//! fire again. Physics data lives in sibling components
//! ([`RigidBody`](super::rigidbody::RigidBody),
//! [`MapPosition`](super::mapposition::MapPosition)) and is driven from this
//! record, never the other way around.

use std::fmt;

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

/// Behavior vocabulary understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    Stand,
    Walk,
    Sit,
    Idle,
    Crawl,
    Climb,
    Jump,
    Fall,
    Drag,
    Bounce,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 10] = [
        BehaviorState::Stand,
        BehaviorState::Walk,
        BehaviorState::Sit,
        BehaviorState::Idle,
        BehaviorState::Crawl,
        BehaviorState::Climb,
        BehaviorState::Jump,
        BehaviorState::Fall,
        BehaviorState::Drag,
        BehaviorState::Bounce,
    ];

    /// States that are only reachable through explicit triggers and never
    /// through a random pick.
    pub const FORBIDDEN_RANDOM: [BehaviorState; 6] = [
        BehaviorState::Fall,
        BehaviorState::Climb,
        BehaviorState::Drag,
        BehaviorState::Crawl,
        BehaviorState::Bounce,
        BehaviorState::Jump,
    ];

    /// Lowercase name as used in sprite descriptors and clip keys.
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::Stand => "stand",
            BehaviorState::Walk => "walk",
            BehaviorState::Sit => "sit",
            BehaviorState::Idle => "idle",
            BehaviorState::Crawl => "crawl",
            BehaviorState::Climb => "climb",
            BehaviorState::Jump => "jump",
            BehaviorState::Fall => "fall",
            BehaviorState::Drag => "drag",
            BehaviorState::Bounce => "bounce",
        }
    }

    /// Parse a (case-insensitive) descriptor state name.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == lower)
    }

    pub fn is_forbidden_random(self) -> bool {
        Self::FORBIDDEN_RANDOM.contains(&self)
    }

    /// Climbing-family states, disabled together when climbing is turned off.
    pub fn is_climbing(self) -> bool {
        matches!(self, BehaviorState::Climb | BehaviorState::Crawl)
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movement direction. Drives velocity, acceleration and gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    UpsideLeft,
    UpsideRight,
    #[default]
    Unknown,
}

impl Direction {
    /// Directions that move against gravity; gravity is off while moving this way.
    pub fn is_moving_up(self) -> bool {
        matches!(
            self,
            Direction::Up | Direction::UpsideLeft | Direction::UpsideRight
        )
    }
}

/// Which way the sprite looks. The sprite art faces right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Per-companion behavior state.
#[derive(Component, Debug, Clone)]
pub struct Companion {
    /// Stable identifier (descriptor `id`, or its name).
    pub id: String,
    /// Sprite sheet name; clip keys are `"<state>-<sprite_name>"`.
    pub sprite_name: String,
    /// Current behavior. `None` only until the first successful transition.
    pub state: Option<BehaviorState>,
    pub direction: Direction,
    pub facing: Facing,
    /// Behaviors the descriptor provides clips for.
    pub available_states: SmallVec<[BehaviorState; 10]>,
    /// World time at which a random state pick may fire again.
    pub random_state_ready_at: f32,
    /// World time at which a random flip may fire again.
    pub flip_ready_at: f32,
}

impl Companion {
    pub fn new(
        id: impl Into<String>,
        sprite_name: impl Into<String>,
        available_states: impl IntoIterator<Item = BehaviorState>,
    ) -> Self {
        let mut states: SmallVec<[BehaviorState; 10]> = SmallVec::new();
        for state in available_states {
            if !states.contains(&state) {
                states.push(state);
            }
        }
        Self {
            id: id.into(),
            sprite_name: sprite_name.into(),
            state: None,
            direction: Direction::Unknown,
            facing: Facing::Right,
            available_states: states,
            random_state_ready_at: 0.0,
            flip_ready_at: 0.0,
        }
    }

    pub fn supports(&self, state: BehaviorState) -> bool {
        self.available_states.contains(&state)
    }

    pub fn is_in(&self, state: BehaviorState) -> bool {
        self.state == Some(state)
    }

    /// Clip key for one of this companion's states.
    pub fn clip_key(&self, state: BehaviorState) -> String {
        format!("{}-{}", state.as_str(), self.sprite_name)
    }

    pub fn can_play_random_state(&self, now: f32) -> bool {
        now >= self.random_state_ready_at
    }

    pub fn can_random_flip(&self, now: f32) -> bool {
        now >= self.flip_ready_at
    }
}
