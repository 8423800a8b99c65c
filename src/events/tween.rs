use bevy_ecs::prelude::*;

use crate::components::tween::TweenPurpose;

/// A [`TweenPosition`](crate::components::tween::TweenPosition) reached its target.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenFinishedEvent {
    pub entity: Entity,
    pub purpose: TweenPurpose,
}
