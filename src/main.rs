//! Deskmate main entry point.
//!
//! Animated desktop companions living in a transparent, always-on-top,
//! click-through window, written in Rust using:
//! - **raylib** for windowing, textures and drawing
//! - **bevy_ecs** for the entity-component-system architecture
//!
//! # Main Loop
//!
//! 1. Load the INI configuration and the sprite descriptors
//! 2. Open a transparent undecorated window covering the current monitor
//! 3. Build the ECS world and the update schedule
//! 4. Every frame: sample the pointer, advance time, load requested sheets,
//!    run the schedule and draw the companions
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --sprites pets/pets.json
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::{Path, PathBuf};

use clap::Parser;
use deskmate::game::{build_update_schedule, init_world};
use deskmate::resources::companionconfig::CompanionConfig;
use deskmate::resources::passthrough::{CompanionHost, screen_to_window_pointer};
use deskmate::resources::pointer::PointerState;
use deskmate::resources::spriteconfig::{SpriteDescriptor, default_descriptor, load_descriptors};
use deskmate::systems::render::render_companions;
use deskmate::systems::sheetloader::load_requested_sheets;
use deskmate::systems::time::update_world_time;
use log::{error, info, warn};
use mouse_position::mouse_position::Mouse;
use raylib::ffi;
use raylib::prelude::*;

/// Desktop companions for your screen.
#[derive(Parser)]
#[command(version, about = "Animated desktop companions that walk, climb and can be dragged around.")]
struct Cli {
    /// Configuration file (default: ./deskmate.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Sprite descriptor JSON file. Overrides `[sprites] path`.
    #[arg(long, value_name = "PATH")]
    sprites: Option<PathBuf>,

    /// Write the configuration file with the current settings and exit.
    #[arg(long)]
    write_default_config: bool,
}

/// Host services backed by raylib's global window state.
struct RaylibHost;

impl CompanionHost for RaylibHost {
    fn pointer_position(&self) -> Result<Option<Vector2>, String> {
        // raylib stops receiving cursor events while the window is click-through,
        // so the cursor is read from the OS
        let screen = match Mouse::get_mouse_position() {
            Mouse::Position { x, y } => Vector2 {
                x: x as f32,
                y: y as f32,
            },
            Mouse::Error => return Err("OS cursor position unavailable".to_string()),
        };
        // SAFETY: the window is created before the host is used and outlives it
        let (origin, dpi) = unsafe {
            if !ffi::IsWindowReady() {
                return Err("window is not ready".to_string());
            }
            (ffi::GetWindowPosition(), ffi::GetWindowScaleDPI())
        };
        Ok(Some(screen_to_window_pointer(
            screen,
            Vector2 {
                x: origin.x,
                y: origin.y,
            },
            Vector2 { x: dpi.x, y: dpi.y },
        )))
    }

    fn set_pointer_passthrough(&mut self, enabled: bool) -> Result<(), String> {
        let flag = ffi::ConfigFlags::FLAG_WINDOW_MOUSE_PASSTHROUGH as u32;
        // SAFETY: window state calls only touch raylib's own window
        unsafe {
            if !ffi::IsWindowReady() {
                return Err("window is not ready".to_string());
            }
            if enabled {
                ffi::SetWindowState(flag);
            } else {
                ffi::ClearWindowState(flag);
            }
        }
        Ok(())
    }

    fn device_pixel_ratio(&self) -> f32 {
        // SAFETY: read-only query of the window scale
        let dpi = unsafe { ffi::GetWindowScaleDPI() };
        if dpi.x > 0.0 { dpi.x } else { 1.0 }
    }
}

fn load_sprite_descriptors(path: Option<&Path>) -> Vec<SpriteDescriptor> {
    let Some(path) = path else {
        info!("No sprite file configured, using the built-in companion");
        return vec![default_descriptor()];
    };
    match load_descriptors(path) {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            warn!("{} lists no sprites, using the built-in companion", path.display());
            vec![default_descriptor()]
        }
        Err(e) => {
            error!("{}; using the built-in companion", e);
            vec![default_descriptor()]
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CompanionConfig::with_path(path),
        None => CompanionConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    if let Some(path) = cli.sprites {
        config.sprites_path = Some(path);
    }

    // Early-exit: write the configuration and quit (no window needed)
    if cli.write_default_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Configuration written to {}", config.config_path.display());
        return;
    }

    let descriptors = load_sprite_descriptors(config.sprites_path.as_deref());
    let base_dir = config
        .sprites_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // --------------- Raylib window ---------------
    let (mut rl, thread) = raylib::init()
        .size(1, 1)
        .title("deskmate")
        .transparent()
        .undecorated()
        .build();
    // SAFETY: the window exists from here on
    let (screen_w, screen_h) = unsafe {
        let monitor = ffi::GetCurrentMonitor();
        (ffi::GetMonitorWidth(monitor), ffi::GetMonitorHeight(monitor))
    };
    rl.set_window_size(screen_w, screen_h);
    rl.set_window_position(0, 0);
    // SAFETY: the window exists
    unsafe { ffi::SetWindowState(ffi::ConfigFlags::FLAG_WINDOW_TOPMOST as u32) };
    rl.set_target_fps(config.target_fps);
    // Disable ESC to exit
    rl.set_exit_key(None);
    info!("Companion window {}x{}", screen_w, screen_h);

    // --------------- ECS world + schedule ---------------
    let bounds = config.world_bounds(screen_w as f32, screen_h as f32);
    let mut world = init_world(config, bounds, &descriptors, Box::new(RaylibHost));
    let mut update = build_update_schedule();
    update
        .initialize(&mut world)
        .expect("Failed to initialize schedule");

    // --------------- Main loop ---------------
    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        // drag input; raylib only sees it while the pointer is captured
        let pointer = rl.get_mouse_position();
        let down = rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT);
        world.resource_mut::<PointerState>().update(pointer, down);
        update_world_time(&mut world, dt);
        load_requested_sheets(&mut world, &mut rl, &thread, &base_dir);

        update.run(&mut world);

        world.clear_trackers(); // Clear changed components for next frame

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLANK);
        render_companions(&mut world, &mut d);
    }
}
