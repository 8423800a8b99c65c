//! Animation playback.
//!
//! [`animation`] advances every playing [`Animation`] by the frame delta,
//! writes the current sheet frame into the entity's [`Sprite`], and triggers an
//! [`AnimationCompleteEvent`] when a clip with a finite repeat count plays its
//! last frame.
//!
//! # Animation Flow
//!
//! 1. Clips are registered in [`AnimationStore`] by the sprite registry
//! 2. Companions carry an [`Animation`] pointing at a clip key
//! 3. [`animation`] advances frames at the clip's `fps`
//! 4. Observers react to [`AnimationCompleteEvent`] (a finished fall, for example)

use bevy_ecs::prelude::*;

use crate::components::animation::Animation;
use crate::components::companion::BehaviorState;
use crate::components::sprite::Sprite;
use crate::events::animation::AnimationCompleteEvent;
use crate::resources::animationstore::AnimationStore;
use crate::resources::worldtime::WorldTime;
use crate::systems::behavior::{BehaviorContext, finish_fall};

/// Advance animation playback and update the sprite frame.
pub fn animation(
    mut query: Query<(Entity, &mut Animation, &mut Sprite)>,
    animation_store: Res<AnimationStore>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut anim, mut sprite) in query.iter_mut() {
        if !anim.is_playing() {
            continue;
        }
        let Some(clip) = animation_store.get(&anim.animation_key) else {
            continue;
        };
        let frame_count = clip.frames.len();
        if frame_count == 0 || clip.fps <= 0.0 {
            continue;
        }

        anim.elapsed_time += time.delta;
        let frame_duration = 1.0 / clip.fps;
        while anim.elapsed_time >= frame_duration {
            anim.elapsed_time -= frame_duration;
            anim.cursor += 1;
            if anim.cursor < frame_count {
                continue;
            }
            match anim.repeat {
                None => anim.cursor = 0,
                Some(repeat) if anim.plays_done < repeat => {
                    anim.plays_done += 1;
                    anim.cursor = 0;
                }
                Some(_) => {
                    anim.cursor = frame_count - 1; // stay on last frame
                    anim.finished = true;
                    commands.trigger(AnimationCompleteEvent {
                        entity,
                        animation_key: anim.animation_key.clone(),
                    });
                    break;
                }
            }
        }

        let frame = clip.frames[anim.cursor.min(frame_count - 1)];
        if sprite.frame != frame {
            sprite.frame = frame;
        }
    }
}

/// A finished fall unlocks random picks and chooses the next state.
pub fn fall_complete_observer(trigger: On<AnimationCompleteEvent>, mut ctx: BehaviorContext) {
    let event = trigger.event();
    let entity = event.entity;
    let key = event.animation_key.clone();
    ctx.drive(entity, |target, env| {
        if target.companion.clip_key(BehaviorState::Fall) == key {
            finish_fall(target, env);
        }
    });
}
