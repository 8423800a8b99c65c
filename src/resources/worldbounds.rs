//! Rectangle companions live in, anchored at the screen origin.

use bevy_ecs::prelude::Resource;
use raylib::prelude::Vector2;

use crate::components::rigidbody::BoundsContact;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Smallest and largest pivot positions for a body whose extents around
    /// the pivot are `before` (left/up) and `after` (right/down).
    pub fn pivot_limits(&self, before: Vector2, after: Vector2) -> (Vector2, Vector2) {
        let min = Vector2 {
            x: before.x,
            y: before.y,
        };
        let max = Vector2 {
            x: (self.width - after.x).max(min.x),
            y: (self.height - after.y).max(min.y),
        };
        (min, max)
    }

    /// Clamp a pivot into the world.
    pub fn clamp_pivot(&self, pos: Vector2, before: Vector2, after: Vector2) -> Vector2 {
        let (min, max) = self.pivot_limits(before, after);
        Vector2 {
            x: pos.x.clamp(min.x, max.x),
            y: pos.y.clamp(min.y, max.y),
        }
    }

    /// Which edges a body at `pos` is touching.
    pub fn touching(&self, pos: Vector2, before: Vector2, after: Vector2) -> BoundsContact {
        let (min, max) = self.pivot_limits(before, after);
        BoundsContact {
            up: pos.y <= min.y,
            down: pos.y >= max.y,
            left: pos.x <= min.x,
            right: pos.x >= max.x,
        }
    }

    /// Pivot y at which a body rests on the ground.
    pub fn ground_y(&self, after: Vector2) -> f32 {
        self.height - after.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vector2 {
        Vector2 { x, y }
    }

    #[test]
    fn clamps_with_extents() {
        let bounds = WorldBounds::new(800.0, 600.0);
        let p = bounds.clamp_pivot(v(-10.0, 700.0), v(16.0, 16.0), v(16.0, 16.0));
        assert_eq!((p.x, p.y), (16.0, 584.0));
        let touching = bounds.touching(p, v(16.0, 16.0), v(16.0, 16.0));
        assert!(touching.left && touching.down);
        assert!(!touching.up && !touching.right);
        assert_eq!(bounds.ground_y(v(16.0, 16.0)), 584.0);
    }
}
