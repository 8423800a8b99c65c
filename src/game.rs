//! World setup and the per-frame schedule.
//!
//! [`init_world`] builds a ready-to-run world from configuration, sprite
//! descriptors and a host; [`build_update_schedule`] returns the systems in
//! the order one frame runs them. Both are free of raylib windowing so tests
//! can drive a headless world with a mock host.

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::animationstore::AnimationStore;
use crate::resources::cadence::BehaviorCadence;
use crate::resources::companionconfig::CompanionConfig;
use crate::resources::passthrough::{CompanionHost, CursorPassthrough, HostBridge};
use crate::resources::pointer::PointerState;
use crate::resources::rng::BehaviorRng;
use crate::resources::scheduler::ScheduledTasks;
use crate::resources::sheetstore::SheetStore;
use crate::resources::spriteconfig::{Registration, SpriteConfigRegistry, SpriteDescriptor};
use crate::resources::texturestore::TextureStore;
use crate::resources::worldbounds::WorldBounds;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::{animation, fall_complete_observer};
use crate::systems::drag::{drag_end_observer, drag_observer, pointer_drag_system};
use crate::systems::hittest::{
    apply_pending_release_system, interaction_allowed, poll_cursor_overlap_system,
};
use crate::systems::movement::movement;
use crate::systems::randombehavior::random_behavior_system;
use crate::systems::scheduler::run_scheduled_tasks;
use crate::systems::spawn::{process_sprite_registrations, spawn_registered_companions};
use crate::systems::time::cadence_ready;
use crate::systems::tween::{tween_finished_observer, tween_mapposition_system};
use crate::systems::worldbounds::{world_bounds_observer, world_bounds_system};

/// Build the world: resources, observers, sprite registrations and the
/// initial click-through request.
pub fn init_world(
    config: CompanionConfig,
    bounds: WorldBounds,
    descriptors: &[SpriteDescriptor],
    host: Box<dyn CompanionHost>,
) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(BehaviorCadence::default());
    world.insert_resource(BehaviorRng::default());
    world.insert_resource(PointerState::default());
    world.insert_resource(ScheduledTasks::default());
    world.insert_resource(TextureStore::default());
    world.insert_resource(bounds);
    world.insert_resource(config);

    let mut registry = SpriteConfigRegistry::default();
    let mut sheets = SheetStore::new();
    let mut clips = AnimationStore::new();
    let registered = descriptors
        .iter()
        .map(|d| registry.register_if_new(d, &mut sheets, &mut clips))
        .filter(|r| matches!(r, Registration::Registered | Registration::Deferred))
        .count();
    info!(
        "{} of {} sprite descriptors accepted",
        registered,
        descriptors.len()
    );
    world.insert_resource(registry);
    world.insert_resource(sheets);
    world.insert_resource(clips);

    let mut host = HostBridge(host);
    let mut passthrough = CursorPassthrough::new();
    passthrough.start(host.0.as_mut());
    world.insert_resource(passthrough);
    world.insert_resource(host);

    register_observers(&mut world);
    world
}

pub fn register_observers(world: &mut World) {
    world.spawn(Observer::new(world_bounds_observer));
    world.spawn(Observer::new(fall_complete_observer));
    world.spawn(Observer::new(tween_finished_observer));
    world.spawn(Observer::new(drag_observer));
    world.spawn(Observer::new(drag_end_observer));
    // Ensure the observers are registered before any system triggers events.
    world.flush();
}

/// One frame: registration, pointer drag, tweens, physics, world edges,
/// animation, due tasks, then the cadence-gated hit test and random roll,
/// and finally any due passthrough release.
pub fn build_update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems((process_sprite_registrations, spawn_registered_companions).chain());
    update.add_systems(
        pointer_drag_system
            .run_if(interaction_allowed)
            .after(spawn_registered_companions),
    );
    update.add_systems(tween_mapposition_system.after(pointer_drag_system));
    update.add_systems(movement.after(tween_mapposition_system));
    update.add_systems(world_bounds_system.after(movement));
    update.add_systems(animation.after(world_bounds_system));
    update.add_systems(run_scheduled_tasks.after(animation));
    update.add_systems(
        poll_cursor_overlap_system
            .run_if(interaction_allowed)
            .run_if(cadence_ready)
            .after(run_scheduled_tasks),
    );
    update.add_systems(
        random_behavior_system
            .run_if(cadence_ready)
            .after(poll_cursor_overlap_system),
    );
    update.add_systems(apply_pending_release_system.after(random_behavior_system));
    update
}
