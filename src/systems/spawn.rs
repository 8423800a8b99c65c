//! Sprite registration and companion spawning.
//!
//! Descriptors are registered when the world is built. Those whose sheet is
//! not loaded yet are retried every frame by [`process_sprite_registrations`];
//! once registered, [`spawn_registered_companions`] turns each descriptor into
//! one companion entity dropped somewhere along the top of the screen.

use bevy_ecs::prelude::*;
use log::{info, warn};
use raylib::prelude::Vector2;

use crate::components::animation::Animation;
use crate::components::companion::{BehaviorState, Companion};
use crate::components::draggable::Draggable;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::resources::animationstore::AnimationStore;
use crate::resources::companionconfig::CompanionConfig;
use crate::resources::rng::BehaviorRng;
use crate::resources::sheetstore::SheetStore;
use crate::resources::spriteconfig::{SpriteConfigRegistry, SpriteDescriptor};
use crate::resources::worldbounds::WorldBounds;
use crate::resources::worldtime::WorldTime;
use crate::systems::behavior::{BehaviorEnv, CompanionMut, jump_or_random};

/// Horizontal margin kept free when picking a spawn x.
pub const SPAWN_MARGIN: f32 = 100.0;

/// Retry registrations that were waiting for their sheet.
pub fn process_sprite_registrations(
    mut registry: ResMut<SpriteConfigRegistry>,
    sheets: Res<SheetStore>,
    mut clips: ResMut<AnimationStore>,
) {
    if !registry.has_pending() {
        return;
    }
    let completed = registry.retry_pending(&sheets, &mut clips);
    if completed > 0 {
        info!("{} deferred sprite registrations completed", completed);
    }
}

/// Behavior states a descriptor provides. Unknown names are skipped.
pub fn companion_states(descriptor: &SpriteDescriptor) -> Vec<BehaviorState> {
    descriptor
        .states
        .keys()
        .filter_map(|name| {
            let state = BehaviorState::from_name(name);
            if state.is_none() {
                warn!(
                    "Sprite '{}' declares unknown state '{}', ignoring it",
                    descriptor.name, name
                );
            }
            state
        })
        .collect()
}

/// Random x inside the margins, y one frame below the top.
pub fn spawn_position(
    bounds: &WorldBounds,
    frame_height: f32,
    scale: f32,
    rng: &mut BehaviorRng,
) -> Vector2 {
    let x = if bounds.width > 2.0 * SPAWN_MARGIN {
        rng.between(SPAWN_MARGIN, bounds.width - SPAWN_MARGIN)
    } else {
        bounds.width * 0.5
    };
    Vector2 {
        x,
        y: frame_height * scale,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_registered_companions(
    mut registry: ResMut<SpriteConfigRegistry>,
    config: Res<CompanionConfig>,
    bounds: Res<WorldBounds>,
    sheets: Res<SheetStore>,
    clips: Res<AnimationStore>,
    time: Res<WorldTime>,
    mut rng: ResMut<BehaviorRng>,
    mut commands: Commands,
) {
    for descriptor in registry.take_ready() {
        let Some((frame_w, frame_h)) = descriptor.frame_size() else {
            warn!("Sprite '{}' has no frame size, not spawning", descriptor.name);
            continue;
        };
        let columns = sheets
            .get(&descriptor.name)
            .map(|sheet| (sheet.width as f32 / frame_w).floor() as u32)
            .filter(|c| *c > 0)
            .or_else(|| descriptor.columns_hint())
            .unwrap_or(1);

        let mut companion = Companion::new(
            descriptor.companion_id(),
            descriptor.name.clone(),
            companion_states(&descriptor),
        );
        let mut body = RigidBody::with_gravity(config.gravity);
        let mut sprite = Sprite::new(descriptor.name.clone(), frame_w, frame_h, columns);
        let mut animation = Animation::empty();
        let position = spawn_position(&bounds, frame_h, config.scale, &mut rng);

        let entity = commands.spawn_empty().id();
        let mut target = CompanionMut {
            entity,
            companion: &mut companion,
            body: &mut body,
            sprite: &mut sprite,
            animation: &mut animation,
        };
        let mut env = BehaviorEnv {
            now: time.elapsed,
            allow_climbing: config.allow_climbing,
            clips: &clips,
            rng: &mut rng,
        };
        jump_or_random(&mut target, &mut env);

        info!(
            "Spawned companion '{}' at ({:.0}, {:.0}) in {:?}",
            companion.id, position.x, position.y, companion.state
        );
        commands.entity(entity).insert((
            companion,
            body,
            MapPosition::new(position.x, position.y),
            sprite,
            Scale::uniform(config.scale),
            animation,
            Draggable,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::spriteconfig::StateDefinition;

    #[test]
    fn unknown_states_are_dropped() {
        let mut descriptor = SpriteDescriptor {
            name: "cat".to_string(),
            ..SpriteDescriptor::default()
        };
        descriptor
            .states
            .insert("walk".to_string(), StateDefinition::line(1, 2));
        descriptor
            .states
            .insert("dance".to_string(), StateDefinition::line(2, 2));
        assert_eq!(companion_states(&descriptor), vec![BehaviorState::Walk]);
    }

    #[test]
    fn spawn_x_keeps_margin() {
        let bounds = WorldBounds::new(1280.0, 720.0);
        let mut rng = BehaviorRng::seeded(11);
        for _ in 0..100 {
            let p = spawn_position(&bounds, 64.0, 2.0, &mut rng);
            assert!(p.x >= SPAWN_MARGIN && p.x <= 1280.0 - SPAWN_MARGIN);
            assert_eq!(p.y, 128.0);
        }
        let narrow = WorldBounds::new(150.0, 720.0);
        assert_eq!(spawn_position(&narrow, 64.0, 1.0, &mut rng).x, 75.0);
    }
}
