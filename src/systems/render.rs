use bevy_ecs::prelude::*;
use raylib::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::resources::texturestore::TextureStore;

/// Source and destination rectangles plus pivot for drawing one sprite.
///
/// A mirrored sprite gets a negative source width; raylib then samples the
/// same frame right to left.
pub fn sprite_draw_params(sprite: &Sprite, pos: Vector2, scale: Scale) -> (Rectangle, Rectangle, Vector2) {
    let offset = sprite.frame_offset();
    let sx = scale.scale.x.abs();
    let sy = scale.scale.y.abs();
    let src = Rectangle {
        x: offset.x,
        y: offset.y,
        width: if sprite.flip_h { -sprite.width } else { sprite.width },
        height: if sprite.flip_v { -sprite.height } else { sprite.height },
    };
    // MapPosition is the pivot
    let dest = Rectangle {
        x: pos.x,
        y: pos.y,
        width: sprite.width * sx,
        height: sprite.height * sy,
    };
    let origin = Vector2 {
        x: sprite.origin.x * sx,
        y: sprite.origin.y * sy,
    };
    (src, dest, origin)
}

/// Draw every companion sprite whose texture is loaded.
///
/// Runs inside raylib's drawing scope. Entities are drawn in query order,
/// which is also the order the pointer hit test treats as bottom to top.
pub fn render_companions(world: &mut World, d: &mut RaylibDrawHandle) {
    let mut q = world.query::<(&Sprite, &MapPosition, Option<&Scale>)>();
    let to_draw: Vec<(Sprite, MapPosition, Scale)> = q
        .iter(world)
        .map(|(s, p, sc)| (s.clone(), *p, sc.copied().unwrap_or_default()))
        .collect();

    let textures = world.resource::<TextureStore>();
    for (sprite, pos, scale) in to_draw.iter() {
        if let Some(tex) = textures.get(&sprite.tex_key) {
            let (src, dest, origin) = sprite_draw_params(sprite, pos.pos, *scale);
            d.draw_texture_pro(tex, src, dest, origin, 0.0, Color::WHITE);
        }
    }
}
