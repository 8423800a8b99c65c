//! Companion configuration resource.
//!
//! Settings loaded from an INI file. Defaults are safe to start with; missing
//! keys keep their default values.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! target_fps = 60
//! scale = 1.0
//!
//! [behavior]
//! allow_interaction = true
//! allow_climbing = true
//! allow_above_taskbar = false
//! taskbar_height = 48
//!
//! [physics]
//! gravity = 200.0
//!
//! [sprites]
//! path = ./pets.json
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::worldbounds::WorldBounds;

const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_ALLOW_INTERACTION: bool = true;
const DEFAULT_ALLOW_CLIMBING: bool = true;
const DEFAULT_ALLOW_ABOVE_TASKBAR: bool = false;
const DEFAULT_TASKBAR_HEIGHT: u32 = 48;
const DEFAULT_GRAVITY: f32 = 200.0;
const DEFAULT_CONFIG_PATH: &str = "./deskmate.ini";

/// Companion configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CompanionConfig {
    /// Target frames per second of the host loop.
    pub target_fps: u32,
    /// Uniform sprite scale.
    pub scale: f32,
    /// Whether companions react to the pointer at all.
    pub allow_interaction: bool,
    /// Whether companions may climb walls and crawl along the ceiling.
    pub allow_climbing: bool,
    /// Keep companions above the taskbar instead of the screen bottom.
    pub allow_above_taskbar: bool,
    /// Height reserved for the taskbar when `allow_above_taskbar` is set.
    pub taskbar_height: u32,
    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,
    /// Sprite descriptor JSON file. `None` uses the built-in companion.
    pub sprites_path: Option<PathBuf>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanionConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            scale: DEFAULT_SCALE,
            allow_interaction: DEFAULT_ALLOW_INTERACTION,
            allow_climbing: DEFAULT_ALLOW_CLIMBING,
            allow_above_taskbar: DEFAULT_ALLOW_ABOVE_TASKBAR,
            taskbar_height: DEFAULT_TASKBAR_HEIGHT,
            gravity: DEFAULT_GRAVITY,
            sprites_path: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: fps={}, scale={}, interaction={}, climbing={}, above_taskbar={}, gravity={}",
            self.target_fps,
            self.scale,
            self.allow_interaction,
            self.allow_climbing,
            self.allow_above_taskbar,
            self.gravity
        );

        Ok(())
    }

    /// Load configuration from INI text. Used by tests and embedders.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [window] section
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(scale) = config.getfloat("window", "scale").ok().flatten() {
            if scale > 0.0 {
                self.scale = scale as f32;
            }
        }

        // [behavior] section
        if let Some(v) = config.getbool("behavior", "allow_interaction").ok().flatten() {
            self.allow_interaction = v;
        }
        if let Some(v) = config.getbool("behavior", "allow_climbing").ok().flatten() {
            self.allow_climbing = v;
        }
        if let Some(v) = config.getbool("behavior", "allow_above_taskbar").ok().flatten() {
            self.allow_above_taskbar = v;
        }
        if let Some(h) = config.getuint("behavior", "taskbar_height").ok().flatten() {
            self.taskbar_height = h as u32;
        }

        // [physics] section
        if let Some(g) = config.getfloat("physics", "gravity").ok().flatten() {
            self.gravity = g as f32;
        }

        // [sprites] section
        if let Some(path) = config.get("sprites", "path") {
            if !path.trim().is_empty() {
                self.sprites_path = Some(PathBuf::from(path.trim()));
            }
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "scale", Some(self.scale.to_string()));

        config.set(
            "behavior",
            "allow_interaction",
            Some(self.allow_interaction.to_string()),
        );
        config.set(
            "behavior",
            "allow_climbing",
            Some(self.allow_climbing.to_string()),
        );
        config.set(
            "behavior",
            "allow_above_taskbar",
            Some(self.allow_above_taskbar.to_string()),
        );
        config.set(
            "behavior",
            "taskbar_height",
            Some(self.taskbar_height.to_string()),
        );

        config.set("physics", "gravity", Some(self.gravity.to_string()));

        if let Some(path) = &self.sprites_path {
            config.set("sprites", "path", Some(path.display().to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// World rectangle for a screen of the given size.
    pub fn world_bounds(&self, screen_width: f32, screen_height: f32) -> WorldBounds {
        let height = if self.allow_above_taskbar {
            (screen_height - self.taskbar_height as f32).max(0.0)
        } else {
            screen_height
        };
        WorldBounds::new(screen_width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let mut config = CompanionConfig::new();
        config
            .load_from_str("[behavior]\nallow_climbing = false\n[physics]\ngravity = 350\n")
            .unwrap();
        assert!(!config.allow_climbing);
        assert_eq!(config.gravity, 350.0);
        assert_eq!(config.target_fps, DEFAULT_TARGET_FPS);
        assert!(config.allow_interaction);
        assert!(config.sprites_path.is_none());
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut config = CompanionConfig::new();
        config
            .load_from_str("[window]\ntarget_fps = fast\nscale = -2\n[sprites]\npath = pets.json\n")
            .unwrap();
        assert_eq!(config.target_fps, DEFAULT_TARGET_FPS);
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.sprites_path, Some(PathBuf::from("pets.json")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = CompanionConfig::with_path("/nonexistent/deskmate.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config, CompanionConfig::with_path("/nonexistent/deskmate.ini"));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("deskmate-test-{}.ini", std::process::id()));
        let mut saved = CompanionConfig::with_path(&path);
        saved.allow_above_taskbar = true;
        saved.taskbar_height = 30;
        saved.save_to_file().unwrap();

        let mut loaded = CompanionConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(loaded.allow_above_taskbar);
        assert_eq!(loaded.taskbar_height, 30);
    }

    #[test]
    fn taskbar_shrinks_world() {
        let mut config = CompanionConfig::new();
        assert_eq!(config.world_bounds(1920.0, 1080.0).height, 1080.0);
        config.allow_above_taskbar = true;
        assert_eq!(config.world_bounds(1920.0, 1080.0).height, 1032.0);
    }
}
