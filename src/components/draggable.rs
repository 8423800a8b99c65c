//! Pointer-drag components.
//!
//! - [`Draggable`] marks entities the pointer may grab.
//! - [`Dragged`] is present while the pointer holds the entity and remembers
//!   where the drag started and where the entity was grabbed.

use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;

/// Marker: the pointer may pick this entity up.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Draggable;

/// Active drag state.
#[derive(Component, Clone, Copy, Debug)]
pub struct Dragged {
    /// Entity position when the drag started.
    pub start: Vector2,
    /// Pointer position minus entity position at grab time.
    pub grab_offset: Vector2,
}

impl Dragged {
    pub fn new(start: Vector2, pointer: Vector2) -> Self {
        Self {
            start,
            grab_offset: Vector2 {
                x: pointer.x - start.x,
                y: pointer.y - start.y,
            },
        }
    }

    /// Where the entity should be for a given pointer position.
    pub fn target_for(&self, pointer: Vector2) -> Vector2 {
        Vector2 {
            x: pointer.x - self.grab_offset.x,
            y: pointer.y - self.grab_offset.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_grab_offset() {
        let d = Dragged::new(Vector2 { x: 100.0, y: 50.0 }, Vector2 { x: 110.0, y: 45.0 });
        let t = d.target_for(Vector2 { x: 210.0, y: 145.0 });
        assert_eq!((t.x, t.y), (200.0, 150.0));
    }
}
