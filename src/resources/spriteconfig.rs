//! Sprite descriptors and the registry that turns them into animation clips.
//!
//! A [`SpriteDescriptor`] is static metadata for one companion: its sheet
//! image, frame geometry and the named behavior states it provides. The
//! [`SpriteConfigRegistry`] validates descriptors, asks the host to load each
//! sheet once, and derives one [`AnimationClip`] per state once the sheet is
//! resident.
//!
//! # Descriptor format (JSON)
//!
//! ```json
//! {
//!   "name": "Pusheen",
//!   "imageSrc": "pets/Pusheen.png",
//!   "frameSize": 128,
//!   "states": {
//!     "stand": { "spriteLine": 1, "frameMax": 1 },
//!     "walk":  { "spriteLine": 2, "frameMax": 4 },
//!     "fall":  { "start": 41, "end": 43 }
//!   }
//! }
//! ```
//!
//! Instead of `frameSize`, a descriptor may give `width`, `height`,
//! `highestFrameMax` and `totalSpriteLine`, from which the frame size is
//! derived. `spriteLine`/`frameMax` states are contiguous frames starting at
//! `(spriteLine - 1) * highestFrameMax`; `start`/`end` states are 1-based
//! inclusive frame indices.

use std::collections::BTreeMap;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use log::{error, info, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::resources::animationstore::{AnimationClip, AnimationStore};
use crate::resources::sheetstore::{SheetInfo, SheetStore};

/// Playback speed of every state clip.
pub const CLIP_FRAME_RATE: f32 = 9.0;

/// How one named state maps onto sheet frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl StateDefinition {
    pub fn line(sprite_line: u32, frame_max: u32) -> Self {
        Self {
            sprite_line: Some(sprite_line),
            frame_max: Some(frame_max),
            ..Self::default()
        }
    }

    pub fn range(start: u32, end: u32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    fn explicit(&self) -> Option<(u32, u32)> {
        match (nonzero(self.start), nonzero(self.end)) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    fn shorthand(&self) -> Option<(u32, u32)> {
        match (nonzero(self.sprite_line), nonzero(self.frame_max)) {
            (Some(line), Some(max)) => Some((line, max)),
            _ => None,
        }
    }

    /// 0-based inclusive frame range, given the sheet's row stride.
    pub fn frame_range(&self, highest_frame_max: u32) -> Option<(usize, usize)> {
        if let Some((start, end)) = self.explicit() {
            if end < start {
                return None;
            }
            return Some((start as usize - 1, end as usize - 1));
        }
        let (line, max) = self.shorthand()?;
        if highest_frame_max == 0 {
            return None;
        }
        let start = (line as usize - 1) * highest_frame_max as usize;
        Some((start, start + max as usize - 1))
    }
}

fn nonzero(v: Option<u32>) -> Option<u32> {
    v.filter(|n| *n > 0)
}

fn positive(v: Option<f32>) -> Option<f32> {
    v.filter(|n| *n > 0.0)
}

/// Static description of one companion's sprite sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub image_src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_frame_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sprite_line: Option<u32>,
    #[serde(default)]
    pub states: BTreeMap<String, StateDefinition>,
}

impl SpriteDescriptor {
    /// Identifier given to spawned companions.
    pub fn companion_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Row stride used by `spriteLine` states.
    ///
    /// The explicit `highestFrameMax` wins; otherwise the largest `frameMax`
    /// across states.
    pub fn highest_frame_max(&self) -> u32 {
        if let Some(max) = nonzero(self.highest_frame_max) {
            return max;
        }
        self.states
            .values()
            .filter_map(|s| nonzero(s.frame_max))
            .max()
            .unwrap_or(0)
    }

    /// Frame width and height in sheet pixels.
    pub fn frame_size(&self) -> Option<(f32, f32)> {
        if let Some(size) = positive(self.frame_size) {
            return Some((size, size));
        }
        let width = positive(self.width)?;
        let height = positive(self.height)?;
        let columns = nonzero(self.highest_frame_max)?;
        let rows = nonzero(self.total_sprite_line)?;
        Some((width / columns as f32, height / rows as f32))
    }

    /// Frames per sheet row, when the descriptor says so.
    pub fn columns_hint(&self) -> Option<u32> {
        let (frame_w, _) = self.frame_size()?;
        match positive(self.width) {
            Some(width) => Some((width / frame_w).floor() as u32),
            None => nonzero(Some(self.highest_frame_max())),
        }
    }

    /// Check that the descriptor can be used. Never panics.
    pub fn validate(&self) -> bool {
        if self.name.is_empty() || self.image_src.is_empty() || self.states.is_empty() {
            return false;
        }
        if self.frame_size().is_none() {
            return false;
        }
        let highest = self.highest_frame_max();
        self.states
            .values()
            .all(|s| s.frame_range(highest).is_some())
    }

    /// Validated copy with lowercase state names.
    ///
    /// When two names collide after lowercasing, the one that was already
    /// lowercase is kept.
    pub fn normalized(&self) -> Option<SpriteDescriptor> {
        if !self.validate() {
            return None;
        }
        let mut states: BTreeMap<String, StateDefinition> = BTreeMap::new();
        for (name, def) in &self.states {
            let lower = name.to_lowercase();
            if lower != *name && self.states.contains_key(&lower) {
                continue;
            }
            states.insert(lower, def.clone());
        }
        Some(SpriteDescriptor {
            states,
            ..self.clone()
        })
    }

    /// How many whole frames `sheet` holds at this descriptor's frame size.
    pub fn sheet_frame_count(&self, sheet: &SheetInfo) -> usize {
        let Some((frame_w, frame_h)) = self.frame_size() else {
            return 0;
        };
        let columns = (sheet.width as f32 / frame_w).floor() as usize;
        let rows = (sheet.height as f32 / frame_h).floor() as usize;
        columns * rows
    }

    /// Copy without the states whose frames run past the end of `sheet`.
    /// `None` when no state is left.
    pub fn fit_to_sheet(&self, sheet: &SheetInfo) -> Option<SpriteDescriptor> {
        let frame_count = self.sheet_frame_count(sheet);
        let highest = self.highest_frame_max();
        let mut states = BTreeMap::new();
        for (name, def) in &self.states {
            match def.frame_range(highest) {
                Some((_, end)) if end < frame_count => {
                    states.insert(name.clone(), def.clone());
                }
                _ => warn!(
                    "Sprite '{}' state '{}' does not fit its {}-frame sheet, dropping it",
                    self.name, name, frame_count
                ),
            }
        }
        if states.is_empty() {
            return None;
        }
        Some(SpriteDescriptor {
            states,
            ..self.clone()
        })
    }

    /// One clip per declared state. Expects a descriptor that passed
    /// [`validate`](Self::validate) and [`fit_to_sheet`](Self::fit_to_sheet);
    /// invalid states are skipped.
    pub fn build_clips(&self, fps: f32) -> Vec<AnimationClip> {
        let highest = self.highest_frame_max();
        self.states
            .iter()
            .filter_map(|(state, def)| {
                let (start, end) = def.frame_range(highest)?;
                Some(AnimationClip {
                    key: format!("{}-{}", state, self.name),
                    tex_key: self.name.clone(),
                    frames: (start..=end).collect(),
                    fps,
                    repeat: None,
                })
            })
            .collect()
    }
}

/// Default companion: a 128px cat sheet with every behavior.
pub fn default_descriptor() -> SpriteDescriptor {
    let states = [
        ("stand", 1, 1),
        ("walk", 2, 4),
        ("sit", 3, 1),
        ("idle", 4, 8),
        ("jump", 5, 1),
        ("fall", 6, 3),
        ("drag", 7, 1),
        ("crawl", 8, 8),
        ("climb", 9, 8),
    ]
    .into_iter()
    .map(|(name, line, max)| (name.to_string(), StateDefinition::line(line, max)))
    .collect();

    SpriteDescriptor {
        name: "Pusheen".to_string(),
        image_src: "pets/Pusheen.png".to_string(),
        frame_size: Some(128.0),
        states,
        ..SpriteDescriptor::default()
    }
}

/// Read a JSON descriptor list (a single descriptor object is accepted too).
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<SpriteDescriptor>, String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sprite descriptors {}: {}", path.display(), e))?;
    parse_descriptors(&text)
}

pub fn parse_descriptors(text: &str) -> Result<Vec<SpriteDescriptor>, String> {
    match serde_json::from_str::<Vec<SpriteDescriptor>>(text) {
        Ok(list) => Ok(list),
        Err(list_err) => serde_json::from_str::<SpriteDescriptor>(text)
            .map(|single| vec![single])
            .map_err(|_| format!("Failed to parse sprite descriptors: {}", list_err)),
    }
}

/// Outcome of [`SpriteConfigRegistry::register_if_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Clips exist and the descriptor is ready to spawn.
    Registered,
    /// Waiting for the host to load the sheet; retried every frame.
    Deferred,
    /// The descriptor failed validation and was skipped.
    Invalid,
    /// The host could not load the sheet.
    Failed,
}

/// Validates descriptors and registers their clips once their sheet is loaded.
#[derive(Resource, Debug)]
pub struct SpriteConfigRegistry {
    fps: f32,
    pending: Vec<SpriteDescriptor>,
    ready: Vec<SpriteDescriptor>,
    registered: FxHashSet<String>,
}

impl Default for SpriteConfigRegistry {
    fn default() -> Self {
        Self::new(CLIP_FRAME_RATE)
    }
}

impl SpriteConfigRegistry {
    pub fn new(fps: f32) -> Self {
        Self {
            fps,
            pending: Vec::new(),
            ready: Vec::new(),
            registered: FxHashSet::default(),
        }
    }

    /// Validate, request the sheet once, and build clips when it is resident.
    pub fn register_if_new(
        &mut self,
        descriptor: &SpriteDescriptor,
        sheets: &mut SheetStore,
        clips: &mut AnimationStore,
    ) -> Registration {
        let Some(descriptor) = descriptor.normalized() else {
            warn!(
                "Skipping invalid sprite descriptor '{}' ({})",
                descriptor.name, descriptor.image_src
            );
            return Registration::Invalid;
        };
        if sheets.request(&descriptor.name, &descriptor.image_src) {
            info!("Requested sprite sheet '{}'", descriptor.name);
        }
        self.try_register(descriptor, sheets, clips)
    }

    fn try_register(
        &mut self,
        descriptor: SpriteDescriptor,
        sheets: &SheetStore,
        clips: &mut AnimationStore,
    ) -> Registration {
        if let Some(sheet) = sheets.get(&descriptor.name) {
            let Some(descriptor) = descriptor.fit_to_sheet(sheet) else {
                warn!(
                    "Sprite '{}' has no state inside its {}x{} sheet, skipping it",
                    descriptor.name, sheet.width, sheet.height
                );
                return Registration::Invalid;
            };
            let mut created = 0;
            for clip in descriptor.build_clips(self.fps) {
                if clips.insert_if_absent(clip) {
                    created += 1;
                }
            }
            if created > 0 {
                info!(
                    "Registered {} clips for sprite '{}'",
                    created, descriptor.name
                );
            }
            self.registered.insert(descriptor.name.clone());
            self.ready.push(descriptor);
            Registration::Registered
        } else if sheets.has_failed(&descriptor.name) {
            error!(
                "Sprite sheet '{}' failed to load, dropping its companion",
                descriptor.name
            );
            Registration::Failed
        } else {
            self.pending.push(descriptor);
            Registration::Deferred
        }
    }

    /// Retry deferred registrations. Returns how many completed.
    pub fn retry_pending(&mut self, sheets: &SheetStore, clips: &mut AnimationStore) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut completed = 0;
        for descriptor in pending {
            if self.try_register(descriptor, sheets, clips) == Registration::Registered {
                completed += 1;
            }
        }
        completed
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Descriptors whose clips are registered and which were not yet spawned.
    pub fn take_ready(&mut self) -> Vec<SpriteDescriptor> {
        std::mem::take(&mut self.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sheetstore::{AlphaMask, SheetInfo};

    fn cat() -> SpriteDescriptor {
        let mut states = BTreeMap::new();
        states.insert("stand".to_string(), StateDefinition::line(1, 1));
        states.insert("walk".to_string(), StateDefinition::line(2, 4));
        states.insert("fall".to_string(), StateDefinition::range(9, 11));
        SpriteDescriptor {
            name: "cat".to_string(),
            image_src: "cat.png".to_string(),
            frame_size: Some(32.0),
            states,
            ..SpriteDescriptor::default()
        }
    }

    #[test]
    fn validate_accepts_complete_descriptor() {
        assert!(cat().validate());
        assert!(default_descriptor().validate());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut d = cat();
        d.name.clear();
        assert!(!d.validate());

        let mut d = cat();
        d.image_src.clear();
        assert!(!d.validate());

        let mut d = cat();
        d.states.clear();
        assert!(!d.validate());

        let mut d = cat();
        d.frame_size = None;
        assert!(!d.validate());
        d.width = Some(128.0);
        d.height = Some(96.0);
        d.highest_frame_max = Some(4);
        assert!(!d.validate());
        d.total_sprite_line = Some(3);
        assert!(d.validate());
        assert_eq!(d.frame_size(), Some((32.0, 32.0)));
    }

    #[test]
    fn validate_rejects_unresolvable_state() {
        let mut d = cat();
        d.states
            .insert("sit".to_string(), StateDefinition { sprite_line: Some(3), ..Default::default() });
        assert!(!d.validate());

        let mut d = cat();
        d.states.insert("sit".to_string(), StateDefinition::range(5, 2));
        assert!(!d.validate());

        let mut d = cat();
        d.states.insert("sit".to_string(), StateDefinition::line(0, 2));
        assert!(!d.validate());
    }

    #[test]
    fn build_clips_follows_shorthand_and_explicit_rules() {
        let clips = cat().build_clips(9.0);
        assert_eq!(clips.len(), 3);
        let by_key = |k: &str| clips.iter().find(|c| c.key == k).unwrap().frames.clone();
        // highest frameMax is 4
        assert_eq!(by_key("stand-cat"), vec![0]);
        assert_eq!(by_key("walk-cat"), vec![4, 5, 6, 7]);
        assert_eq!(by_key("fall-cat"), vec![8, 9, 10]);
        assert!(clips.iter().all(|c| c.repeat.is_none() && c.fps == 9.0));
    }

    #[test]
    fn explicit_highest_frame_max_sets_row_stride() {
        let mut d = cat();
        d.highest_frame_max = Some(8);
        let clips = d.build_clips(9.0);
        let walk = clips.iter().find(|c| c.key == "walk-cat").unwrap();
        assert_eq!(walk.frames, vec![8, 9, 10, 11]);
    }

    #[test]
    fn normalized_lowercases_without_mutating_input() {
        let mut d = cat();
        let walk = d.states.remove("walk").unwrap();
        d.states.insert("Walk".to_string(), walk);
        let n = d.normalized().unwrap();
        assert!(n.states.contains_key("walk"));
        assert!(!n.states.contains_key("Walk"));
        assert!(d.states.contains_key("Walk"));
    }

    #[test]
    fn normalized_prefers_lowercase_key_on_collision() {
        let mut d = cat();
        d.states.insert("WALK".to_string(), StateDefinition::line(3, 1));
        let n = d.normalized().unwrap();
        assert_eq!(n.states["walk"], StateDefinition::line(2, 4));
        assert_eq!(n.states.len(), 3);
    }

    #[test]
    fn parse_descriptor_json() {
        let json = r#"[{
            "name": "cat",
            "imageSrc": "cat.png",
            "frameSize": 64,
            "states": { "Stand": { "spriteLine": 1, "frameMax": 2 }, "fall": { "start": 3, "end": 4 } }
        }]"#;
        let list = parse_descriptors(json).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].frame_size, Some(64.0));
        assert_eq!(list[0].states["fall"], StateDefinition::range(3, 4));

        let single = parse_descriptors(r#"{"name":"dog","imageSrc":"d.png","states":{}}"#).unwrap();
        assert_eq!(single[0].name, "dog");
        assert!(parse_descriptors("not json").is_err());
    }

    #[test]
    fn registration_defers_until_sheet_is_resident() {
        let mut registry = SpriteConfigRegistry::default();
        let mut sheets = SheetStore::new();
        let mut clips = AnimationStore::new();

        assert_eq!(
            registry.register_if_new(&cat(), &mut sheets, &mut clips),
            Registration::Deferred
        );
        assert!(clips.is_empty());
        assert!(registry.has_pending());
        assert_eq!(registry.retry_pending(&sheets, &mut clips), 0);

        sheets.insert("cat", SheetInfo::new(128, 96, AlphaMask::solid(128, 96)));
        assert_eq!(registry.retry_pending(&sheets, &mut clips), 1);
        assert_eq!(registry.retry_pending(&sheets, &mut clips), 0);
        assert_eq!(clips.len(), 3);
        assert!(registry.is_registered("cat"));
        assert_eq!(registry.take_ready().len(), 1);
        assert!(registry.take_ready().is_empty());
    }

    #[test]
    fn fit_to_sheet_drops_states_past_the_last_frame() {
        // 4 x 3 frames of 32px
        let sheet = SheetInfo::new(128, 96, AlphaMask::solid(128, 96));
        let mut d = cat();
        assert_eq!(d.sheet_frame_count(&sheet), 12);
        d.states
            .insert("sit".to_string(), StateDefinition::range(1, 4_000_000_000));
        d.states.insert("idle".to_string(), StateDefinition::range(12, 13));
        d.states.insert("crawl".to_string(), StateDefinition::line(4, 1));

        let fitted = d.fit_to_sheet(&sheet).unwrap();
        let kept: Vec<&str> = fitted.states.keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["fall", "stand", "walk"]);
        assert_eq!(d.states.len(), 6);

        let tiny = SheetInfo::new(16, 16, AlphaMask::solid(16, 16));
        assert!(cat().fit_to_sheet(&tiny).is_none());
    }

    #[test]
    fn oversized_state_is_not_registered() {
        let mut registry = SpriteConfigRegistry::default();
        let mut sheets = SheetStore::new();
        let mut clips = AnimationStore::new();
        let mut d = cat();
        d.states
            .insert("sit".to_string(), StateDefinition::range(1, 4_000_000_000));

        sheets.insert("cat", SheetInfo::new(128, 96, AlphaMask::solid(128, 96)));
        assert_eq!(
            registry.register_if_new(&d, &mut sheets, &mut clips),
            Registration::Registered
        );
        assert_eq!(clips.len(), 3);
        assert!(!clips.contains("sit-cat"));
        let ready = registry.take_ready();
        assert!(!ready[0].states.contains_key("sit"));

        let mut registry = SpriteConfigRegistry::default();
        let mut clips = AnimationStore::new();
        sheets.insert("dot", SheetInfo::new(16, 16, AlphaMask::solid(16, 16)));
        let mut dot = cat();
        dot.name = "dot".to_string();
        assert_eq!(
            registry.register_if_new(&dot, &mut sheets, &mut clips),
            Registration::Invalid
        );
        assert!(clips.is_empty());
        assert!(registry.take_ready().is_empty());
    }

    #[test]
    fn registering_same_name_twice_loads_sheet_once() {
        let mut registry = SpriteConfigRegistry::default();
        let mut sheets = SheetStore::new();
        let mut clips = AnimationStore::new();

        registry.register_if_new(&cat(), &mut sheets, &mut clips);
        registry.register_if_new(&cat(), &mut sheets, &mut clips);
        assert_eq!(sheets.drain_requests().len(), 1);

        sheets.insert("cat", SheetInfo::new(128, 96, AlphaMask::solid(128, 96)));
        assert_eq!(registry.retry_pending(&sheets, &mut clips), 2);
        assert_eq!(clips.len(), 3);
        // both companions spawn from the one sheet
        assert_eq!(registry.take_ready().len(), 2);
    }

    #[test]
    fn invalid_and_failed_registrations() {
        let mut registry = SpriteConfigRegistry::default();
        let mut sheets = SheetStore::new();
        let mut clips = AnimationStore::new();

        let mut bad = cat();
        bad.image_src.clear();
        assert_eq!(
            registry.register_if_new(&bad, &mut sheets, &mut clips),
            Registration::Invalid
        );
        assert!(sheets.drain_requests().is_empty());

        registry.register_if_new(&cat(), &mut sheets, &mut clips);
        sheets.mark_failed("cat");
        assert_eq!(registry.retry_pending(&sheets, &mut clips), 0);
        assert!(!registry.has_pending());
        assert!(registry.take_ready().is_empty());
    }
}
