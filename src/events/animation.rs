use bevy_ecs::prelude::*;

/// A clip with a finite repeat count played its last frame.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AnimationCompleteEvent {
    pub entity: Entity,
    pub animation_key: String,
}
