use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;

use crate::components::scale::Scale;

/// Sprite is identified by a texture key, its frame size in pixels and the
/// frame currently shown from the sheet.
///
/// Frames are numbered row-major across the sheet, `columns` frames per row.
/// The origin is the pivot (in frame pixels) that `MapPosition` refers to.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub tex_key: String,
    pub width: f32,
    pub height: f32,
    pub columns: u32,
    pub frame: usize,
    pub origin: Vector2,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Sprite {
    /// Sprite with a centered pivot.
    pub fn new(tex_key: impl Into<String>, width: f32, height: f32, columns: u32) -> Self {
        Self {
            tex_key: tex_key.into(),
            width,
            height,
            columns: columns.max(1),
            frame: 0,
            origin: Vector2 {
                x: width * 0.5,
                y: height * 0.5,
            },
            flip_h: false,
            flip_v: false,
        }
    }

    /// Top-left pixel of the current frame inside the sheet.
    pub fn frame_offset(&self) -> Vector2 {
        let col = self.frame as u32 % self.columns;
        let row = self.frame as u32 / self.columns;
        Vector2 {
            x: col as f32 * self.width,
            y: row as f32 * self.height,
        }
    }

    /// Distance from the pivot to the left/top edge and to the right/bottom
    /// edge, in world units.
    pub fn extents(&self, scale: &Scale) -> (Vector2, Vector2) {
        let sx = scale.scale.x.abs();
        let sy = scale.scale.y.abs();
        let before = Vector2 {
            x: self.origin.x * sx,
            y: self.origin.y * sy,
        };
        let after = Vector2 {
            x: (self.width - self.origin.x) * sx,
            y: (self.height - self.origin.y) * sy,
        };
        (before, after)
    }

    /// Map a world point to a pixel of the sheet, honoring flip and scale.
    /// Returns `None` when the point is outside the drawn frame.
    pub fn sheet_pixel_at(&self, point: Vector2, pos: Vector2, scale: &Scale) -> Option<(u32, u32)> {
        let sx = scale.scale.x.abs();
        let sy = scale.scale.y.abs();
        if sx <= 0.0 || sy <= 0.0 {
            return None;
        }
        let lx = (point.x - pos.x) / sx + self.origin.x;
        let ly = (point.y - pos.y) / sy + self.origin.y;
        if lx < 0.0 || ly < 0.0 || lx >= self.width || ly >= self.height {
            return None;
        }
        let (w, h) = (self.width as u32, self.height as u32);
        let mut px = (lx.floor() as u32).min(w.saturating_sub(1));
        let mut py = (ly.floor() as u32).min(h.saturating_sub(1));
        if self.flip_h {
            px = w.saturating_sub(1) - px;
        }
        if self.flip_v {
            py = h.saturating_sub(1) - py;
        }
        let offset = self.frame_offset();
        Some((offset.x as u32 + px, offset.y as u32 + py))
    }
}
