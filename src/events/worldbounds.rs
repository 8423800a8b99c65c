//! World-edge contact events.
//!
//! The bounds system in [`crate::systems::worldbounds`] triggers a
//! [`WorldBoundsEvent`] when a companion's body comes into contact with one or
//! more edges of the world it was not touching on the previous frame. Resting
//! on the ground does not re-trigger the event every frame.

use bevy_ecs::prelude::*;

use crate::components::rigidbody::BoundsContact;

/// Event fired when a body newly touches world edges.
#[derive(Event, Debug, Clone, Copy)]
pub struct WorldBoundsEvent {
    pub entity: Entity,
    /// Edges entered on this frame.
    pub sides: BoundsContact,
}
