//! Pixel-accurate pointer hit testing and passthrough polling.
//!
//! A point hits a companion when it lands on an opaque pixel of the frame the
//! companion is currently showing, after undoing its position, scale and
//! flip. Sheets without pixel data never hit.

use bevy_ecs::prelude::*;
use log::warn;
use raylib::prelude::Vector2;

use crate::components::draggable::Draggable;
use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::resources::companionconfig::CompanionConfig;
use crate::resources::passthrough::{CursorPassthrough, HostBridge};
use crate::resources::sheetstore::SheetStore;
use crate::resources::worldtime::WorldTime;

/// Whether `point` covers an opaque pixel of the sprite drawn at `pos`.
pub fn hits_companion(
    point: Vector2,
    pos: &MapPosition,
    sprite: &Sprite,
    scale: &Scale,
    sheets: &SheetStore,
) -> bool {
    let Some((x, y)) = sprite.sheet_pixel_at(point, pos.pos, scale) else {
        return false;
    };
    sheets
        .get(&sprite.tex_key)
        .is_some_and(|sheet| sheet.alpha.is_opaque(x, y))
}

/// Topmost companion under `point`. Later candidates are drawn above
/// earlier ones.
pub fn hit_test<'a>(
    point: Vector2,
    candidates: impl IntoIterator<Item = (Entity, &'a MapPosition, &'a Sprite, Option<&'a Scale>)>,
    sheets: &SheetStore,
) -> Option<Entity> {
    candidates
        .into_iter()
        .filter(|(_, pos, sprite, scale)| {
            let scale = scale.copied().unwrap_or_default();
            hits_companion(point, pos, sprite, &scale, sheets)
        })
        .last()
        .map(|(entity, ..)| entity)
}

/// Run condition: companions react to the pointer.
pub fn interaction_allowed(config: Res<CompanionConfig>) -> bool {
    config.allow_interaction
}

/// Sample the host pointer and capture or schedule a release of it.
pub fn poll_cursor_overlap_system(
    companions: Query<(&MapPosition, &Sprite, Option<&Scale>), With<Draggable>>,
    sheets: Res<SheetStore>,
    mut passthrough: ResMut<CursorPassthrough>,
    mut host: ResMut<HostBridge>,
    time: Res<WorldTime>,
) {
    let device_pointer = match host.0.pointer_position() {
        Ok(p) => p,
        Err(e) => {
            warn!("Pointer position unavailable: {}", e);
            None
        }
    };
    let dpr = host.0.device_pixel_ratio();
    let hit = |point: Vector2| {
        companions.iter().any(|(pos, sprite, scale)| {
            let scale = scale.copied().unwrap_or_default();
            hits_companion(point, pos, sprite, &scale, &sheets)
        })
    };
    passthrough.poll_cursor_overlap(device_pointer, dpr, hit, host.0.as_mut(), time.elapsed);
}

/// Perform a due passthrough release. Runs every frame.
pub fn apply_pending_release_system(
    mut passthrough: ResMut<CursorPassthrough>,
    mut host: ResMut<HostBridge>,
    time: Res<WorldTime>,
) {
    passthrough.apply_pending_release(host.0.as_mut(), time.elapsed);
}
