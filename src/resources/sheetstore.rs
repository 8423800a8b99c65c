//! Sprite-sheet residency and load-request queue.
//!
//! The engine never loads images itself. The sprite registry asks this store
//! for a sheet with [`SheetStore::request`]; the host drains the queue with
//! [`SheetStore::drain_requests`], loads the image however it likes, and
//! reports back with [`SheetStore::insert`] or [`SheetStore::mark_failed`].
//! Each sheet name is requested at most once.
//!
//! Besides residency the store keeps per-sheet pixel data used for frame
//! layout and pixel-accurate pointer hit testing.

use bevy_ecs::prelude::Resource;
use rustc_hash::{FxHashMap, FxHashSet};

/// Opaque/transparent pixel map of a whole sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    opaque: Vec<bool>,
}

impl AlphaMask {
    /// Build from row-major alpha values; alpha 0 is transparent.
    pub fn from_alpha(width: u32, height: u32, alpha: impl IntoIterator<Item = u8>) -> Self {
        let mut opaque: Vec<bool> = alpha.into_iter().map(|a| a > 0).collect();
        opaque.resize((width * height) as usize, false);
        Self {
            width,
            height,
            opaque,
        }
    }

    /// Every pixel opaque. Used when the host cannot read pixel data.
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opaque: vec![true; (width * height) as usize],
        }
    }

    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.opaque
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(false)
    }
}

/// Facts about a resident sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetInfo {
    pub width: u32,
    pub height: u32,
    pub alpha: AlphaMask,
}

impl SheetInfo {
    pub fn new(width: u32, height: u32, alpha: AlphaMask) -> Self {
        Self {
            width,
            height,
            alpha,
        }
    }
}

/// A pending request for the host loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRequest {
    pub name: String,
    pub image_src: String,
}

#[derive(Resource, Debug, Default)]
pub struct SheetStore {
    sheets: FxHashMap<String, SheetInfo>,
    requested: FxHashSet<String>,
    failed: FxHashSet<String>,
    queue: Vec<SheetRequest>,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a load for `name` unless it was requested before.
    /// Returns true when a new request was queued.
    pub fn request(&mut self, name: &str, image_src: &str) -> bool {
        if !self.requested.insert(name.to_string()) {
            return false;
        }
        self.queue.push(SheetRequest {
            name: name.to_string(),
            image_src: image_src.to_string(),
        });
        true
    }

    /// Take the queued requests. Called by the host loader.
    pub fn drain_requests(&mut self) -> Vec<SheetRequest> {
        std::mem::take(&mut self.queue)
    }

    /// Record a loaded sheet.
    pub fn insert(&mut self, name: impl Into<String>, info: SheetInfo) {
        let name = name.into();
        self.requested.insert(name.clone());
        self.failed.remove(&name);
        self.sheets.insert(name, info);
    }

    pub fn mark_failed(&mut self, name: impl Into<String>) {
        self.failed.insert(name.into());
    }

    pub fn has_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&SheetInfo> {
        self.sheets.get(name)
    }
}
