//! Animation resource registry.
//!
//! This module provides a store for animation clips that can be reused by
//! multiple entities. Clips are created once per key by the sprite registry
//! and are read-only afterwards.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

/// Central registry of animation clips keyed by `"<state>-<spriteName>"`.
#[derive(Resource, Debug, Default)]
pub struct AnimationStore {
    pub animations: FxHashMap<String, AnimationClip>,
}

/// Immutable playback data for one state of one sprite sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub key: String,
    /// Texture key of the sprite sheet the frames come from.
    pub tex_key: String,
    /// 0-based sheet frame indices in playback order.
    pub frames: Vec<usize>,
    /// Frames per second playback speed.
    pub fps: f32,
    /// Extra plays after the first; `None` loops forever.
    pub repeat: Option<u32>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.animations.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AnimationClip> {
        self.animations.get(key)
    }

    /// Insert a clip unless one with the same key exists.
    /// Returns true when the clip was added.
    pub fn insert_if_absent(&mut self, clip: AnimationClip) -> bool {
        if self.animations.contains_key(&clip.key) {
            return false;
        }
        self.animations.insert(clip.key.clone(), clip);
        true
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
