//! Per-frame pointer input in scene units.

use bevy_ecs::prelude::Resource;
use raylib::prelude::Vector2;

/// Weight of the newest frame delta in the smoothed velocity.
const VELOCITY_SMOOTHING: f32 = 0.2;

/// Pointer snapshot written by the host once per frame.
///
/// `velocity` is a smoothed per-frame displacement, used to throw companions
/// on release.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub position: Vector2,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    pub velocity: Vector2,
}

impl PointerState {
    /// Record this frame's pointer position and button state.
    pub fn update(&mut self, position: Vector2, down: bool) {
        let delta = Vector2 {
            x: position.x - self.position.x,
            y: position.y - self.position.y,
        };
        self.velocity = Vector2 {
            x: self.velocity.x + (delta.x - self.velocity.x) * VELOCITY_SMOOTHING,
            y: self.velocity.y + (delta.y - self.velocity.y) * VELOCITY_SMOOTHING,
        };
        self.pressed = down && !self.down;
        self.released = !down && self.down;
        self.down = down;
        self.position = position;
    }
}
