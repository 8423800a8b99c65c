//! Host boundary integration tests: sprite sheet requests and registration,
//! and pointer passthrough driven by the update schedule.

use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use raylib::prelude::Vector2;

use deskmate::components::companion::Companion;
use deskmate::components::mapposition::MapPosition;
use deskmate::game::{build_update_schedule, init_world};
use deskmate::resources::animationstore::AnimationStore;
use deskmate::resources::companionconfig::CompanionConfig;
use deskmate::resources::passthrough::{CompanionHost, CursorPassthrough};
use deskmate::resources::sheetstore::{AlphaMask, SheetInfo, SheetStore};
use deskmate::resources::spriteconfig::{
    SpriteConfigRegistry, SpriteDescriptor, StateDefinition, default_descriptor, parse_descriptors,
};
use deskmate::resources::worldbounds::WorldBounds;
use deskmate::systems::time::update_world_time;

const DT: f32 = 1.0 / 60.0;

#[derive(Default, Clone)]
struct MockHost {
    pointer: Arc<Mutex<Option<Vector2>>>,
    calls: Arc<Mutex<Vec<bool>>>,
    dpr: f32,
}

impl CompanionHost for MockHost {
    fn pointer_position(&self) -> Result<Option<Vector2>, String> {
        self.pointer
            .lock()
            .map(|p| *p)
            .map_err(|e| e.to_string())
    }
    fn set_pointer_passthrough(&mut self, enabled: bool) -> Result<(), String> {
        self.calls
            .lock()
            .map(|mut calls| calls.push(enabled))
            .map_err(|e| e.to_string())
    }
    fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }
}

impl MockHost {
    fn with_dpr(dpr: f32) -> Self {
        Self {
            dpr,
            ..Self::default()
        }
    }

    fn point_at(&self, p: Option<Vector2>) {
        *self.pointer.lock().unwrap() = p;
    }

    fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

fn cat() -> SpriteDescriptor {
    let mut d = SpriteDescriptor {
        name: "cat".to_string(),
        image_src: "cat.png".to_string(),
        frame_size: Some(32.0),
        ..SpriteDescriptor::default()
    };
    d.states.insert("stand".to_string(), StateDefinition::line(1, 1));
    d.states.insert("sit".to_string(), StateDefinition::line(2, 1));
    d
}

fn load_sheets(world: &mut World) -> usize {
    let requests = world.resource_mut::<SheetStore>().drain_requests();
    let count = requests.len();
    for request in requests {
        world.resource_mut::<SheetStore>().insert(
            request.name,
            SheetInfo::new(32, 64, AlphaMask::solid(32, 64)),
        );
    }
    count
}

fn step(world: &mut World, schedule: &mut Schedule) {
    update_world_time(world, DT);
    schedule.run(world);
    world.clear_trackers();
}

fn companion_count(world: &mut World) -> usize {
    let mut q = world.query::<&Companion>();
    q.iter(world).count()
}

// ==================== Registration ====================

#[test]
fn same_sheet_is_requested_once() {
    let mut world = init_world(
        CompanionConfig::new(),
        WorldBounds::new(800.0, 600.0),
        &[cat(), cat()],
        Box::new(MockHost::with_dpr(1.0)),
    );
    let mut schedule = build_update_schedule();
    assert_eq!(load_sheets(&mut world), 1);

    step(&mut world, &mut schedule);
    assert_eq!(load_sheets(&mut world), 0);
    assert_eq!(world.resource::<AnimationStore>().len(), 2);
    assert!(world.resource::<SpriteConfigRegistry>().is_registered("cat"));
    assert_eq!(companion_count(&mut world), 2);
}

#[test]
fn invalid_and_failed_sprites_spawn_nothing() {
    let mut broken = cat();
    broken.frame_size = None;
    let mut missing = cat();
    missing.name = "ghost".to_string();
    missing.image_src = "ghost.png".to_string();

    let mut world = init_world(
        CompanionConfig::new(),
        WorldBounds::new(800.0, 600.0),
        &[broken, missing],
        Box::new(MockHost::with_dpr(1.0)),
    );
    let mut schedule = build_update_schedule();
    let requests = world.resource_mut::<SheetStore>().drain_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "ghost");
    world.resource_mut::<SheetStore>().mark_failed("ghost");

    for _ in 0..5 {
        step(&mut world, &mut schedule);
    }
    assert_eq!(companion_count(&mut world), 0);
    assert!(!world.resource::<SpriteConfigRegistry>().has_pending());
}

#[test]
fn deferred_registration_spawns_once_sheet_arrives() {
    let mut world = init_world(
        CompanionConfig::new(),
        WorldBounds::new(800.0, 600.0),
        &[default_descriptor()],
        Box::new(MockHost::with_dpr(1.0)),
    );
    let mut schedule = build_update_schedule();
    for _ in 0..3 {
        step(&mut world, &mut schedule);
    }
    assert_eq!(companion_count(&mut world), 0);
    assert!(world.resource::<SpriteConfigRegistry>().has_pending());

    let requests = world.resource_mut::<SheetStore>().drain_requests();
    assert_eq!(requests[0].image_src, "pets/Pusheen.png");
    world.resource_mut::<SheetStore>().insert(
        requests[0].name.clone(),
        SheetInfo::new(1024, 1152, AlphaMask::solid(1024, 1152)),
    );
    step(&mut world, &mut schedule);
    assert_eq!(companion_count(&mut world), 1);
    assert_eq!(world.resource::<AnimationStore>().len(), 9);
}

#[test]
fn descriptor_json_round_trip_into_world() {
    let json = r#"[{
        "name": "Fox",
        "imageSrc": "fox.png",
        "width": 256, "height": 128,
        "highestFrameMax": 4, "totalSpriteLine": 2,
        "states": {
            "Stand": { "spriteLine": 1, "frameMax": 4 },
            "walk": { "start": 5, "end": 8 }
        }
    }]"#;
    let descriptors = parse_descriptors(json).unwrap();
    let mut world = init_world(
        CompanionConfig::new(),
        WorldBounds::new(800.0, 600.0),
        &descriptors,
        Box::new(MockHost::with_dpr(1.0)),
    );
    let mut schedule = build_update_schedule();
    let requests = world.resource_mut::<SheetStore>().drain_requests();
    world.resource_mut::<SheetStore>().insert(
        requests[0].name.clone(),
        SheetInfo::new(256, 128, AlphaMask::solid(256, 128)),
    );
    step(&mut world, &mut schedule);

    let clips = world.resource::<AnimationStore>();
    assert_eq!(clips.get("stand-Fox").unwrap().frames, vec![0, 1, 2, 3]);
    assert_eq!(clips.get("walk-Fox").unwrap().frames, vec![4, 5, 6, 7]);
    assert_eq!(companion_count(&mut world), 1);
}

// ==================== Passthrough ====================

fn passthrough_world(config: CompanionConfig, host: &MockHost) -> (World, Schedule, Entity) {
    let mut world = init_world(
        config,
        WorldBounds::new(800.0, 600.0),
        &[cat()],
        Box::new(host.clone()),
    );
    let mut schedule = build_update_schedule();
    load_sheets(&mut world);
    // let the companion land and settle
    for _ in 0..(6.0 / DT) as usize {
        step(&mut world, &mut schedule);
    }
    let mut q = world.query_filtered::<Entity, With<Companion>>();
    let e = q.iter(&world).next().unwrap();
    (world, schedule, e)
}

fn run_with_pointer_on(world: &mut World, schedule: &mut Schedule, host: &MockHost, e: Entity, dpr: f32, frames: usize) {
    for _ in 0..frames {
        let pos = world.get::<MapPosition>(e).unwrap().pos;
        host.point_at(Some(Vector2 {
            x: pos.x * dpr,
            y: pos.y * dpr,
        }));
        step(world, schedule);
    }
}

#[test]
fn pointer_over_companion_captures_then_releases() {
    let host = MockHost::with_dpr(1.0);
    let (mut world, mut schedule, e) = passthrough_world(CompanionConfig::new(), &host);
    assert_eq!(host.calls(), vec![true]);
    assert!(world.resource::<CursorPassthrough>().passthrough);

    // a few frames cover at least one behavior tick
    run_with_pointer_on(&mut world, &mut schedule, &host, e, 1.0, 15);
    assert_eq!(host.calls(), vec![true, false]);
    assert!(!world.resource::<CursorPassthrough>().passthrough);

    host.point_at(Some(Vector2 { x: -500.0, y: -500.0 }));
    for _ in 0..30 {
        step(&mut world, &mut schedule);
    }
    assert_eq!(host.calls(), vec![true, false, true]);
    assert!(world.resource::<CursorPassthrough>().passthrough);
}

#[test]
fn device_pixels_are_scaled_to_scene_units() {
    let host = MockHost::with_dpr(2.0);
    let (mut world, mut schedule, e) = passthrough_world(CompanionConfig::new(), &host);
    run_with_pointer_on(&mut world, &mut schedule, &host, e, 2.0, 15);
    assert_eq!(host.calls(), vec![true, false]);
}

#[test]
fn no_capture_when_interaction_disabled() {
    let host = MockHost::with_dpr(1.0);
    let mut config = CompanionConfig::new();
    config.allow_interaction = false;
    let (mut world, mut schedule, e) = passthrough_world(config, &host);
    run_with_pointer_on(&mut world, &mut schedule, &host, e, 1.0, 30);
    assert_eq!(host.calls(), vec![true]);
}
