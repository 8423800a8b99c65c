//! Pointer drag events.
//!
//! Emitted by [`crate::systems::drag::pointer_drag_system`] from the per-frame
//! [`PointerState`](crate::resources::pointer::PointerState):
//! - [`DragEvent`] every frame the pointer holds a companion
//! - [`DragEndEvent`] once when the pointer lets go

use bevy_ecs::prelude::*;
use raylib::prelude::Vector2;

/// The pointer is holding `entity`; `position` is where the entity should be.
#[derive(Event, Debug, Clone, Copy)]
pub struct DragEvent {
    pub entity: Entity,
    pub position: Vector2,
}

/// The pointer released `entity`, moving at `velocity` (pixels per frame).
#[derive(Event, Debug, Clone, Copy)]
pub struct DragEndEvent {
    pub entity: Entity,
    pub velocity: Vector2,
}
