//! Position tween component.
//!
//! [`TweenPosition`] moves an entity's [`MapPosition`](super::mapposition::MapPosition)
//! from one point to another over a fixed duration. Companions use it for
//! the drag-release glide and for jump arcs off walls; when the tween ends
//! the tween system removes the component and triggers a
//! [`TweenFinishedEvent`](crate::events::tween::TweenFinishedEvent) carrying
//! the [`TweenPurpose`].

use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Easing {
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Starts fast, decelerates hard (quartic).
    QuartOut,
}

/// What the controller should do once the tween arrives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TweenPurpose {
    /// Glide after the pointer let go of a dragged companion.
    DragRelease,
    /// Timed jump from a wall or ceiling down to the ground.
    JumpArc,
}

/// Animates an entity's position between two points.
#[derive(Component, Clone, Debug)]
pub struct TweenPosition {
    /// Starting position.
    pub from: Vector2,
    /// Ending position.
    pub to: Vector2,
    /// Duration in seconds.
    pub duration: f32,
    /// Easing function to use.
    pub easing: Easing,
    /// Whether the tween is currently playing.
    pub playing: bool,
    /// Current time within the tween.
    pub time: f32,
    pub purpose: TweenPurpose,
}

impl TweenPosition {
    pub fn new(from: Vector2, to: Vector2, duration: f32, purpose: TweenPurpose) -> Self {
        TweenPosition {
            from,
            to,
            duration,
            easing: Easing::QuadOut,
            playing: true,
            time: 0.0,
            purpose,
        }
    }
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}
