//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: timing, configuration, asset and
//! clip registries, deferred tasks and the host bridge.
//!
//! Overview
//! - `animationstore` – clips reused across companions of the same sprite
//! - `cadence` – fixed-rate gate for hit testing and random behavior
//! - `companionconfig` – INI-backed settings
//! - `passthrough` – pointer passthrough debounce and the host trait
//! - `pointer` – per-frame pointer position, buttons and velocity
//! - `rng` – random source for behavior rolls
//! - `scheduler` – deferred per-companion tasks
//! - `sheetstore` – sprite-sheet residency and load requests
//! - `spriteconfig` – sprite descriptors and their registry
//! - `texturestore` – raylib textures keyed by sprite name
//! - `worldbounds` – the rectangle companions live in
//! - `worldtime` – simulation time and delta
pub mod animationstore;
pub mod cadence;
pub mod companionconfig;
pub mod passthrough;
pub mod pointer;
pub mod rng;
pub mod scheduler;
pub mod sheetstore;
pub mod spriteconfig;
pub mod texturestore;
pub mod worldbounds;
pub mod worldtime;
