//! Engine systems.
//!
//! This module groups the ECS systems and observers that advance the
//! companions: physics, world edges, animation, pointer interaction, the
//! behavior state machine and drawing.
//!
//! Submodules overview
//! - [`animation`] – advance sprite clips and report finished ones
//! - [`behavior`] – the companion state machine shared by every trigger
//! - [`drag`] – grab, hold and throw companions with the pointer
//! - [`hittest`] – pixel-accurate pointer hits and passthrough polling
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`randombehavior`] – the periodic random roll tables
//! - [`render`] – draw companions using Raylib
//! - [`scheduler`] – run deferred per-companion tasks
//! - [`sheetloader`] – load requested sprite sheets into textures
//! - [`spawn`] – finish sprite registrations and spawn companions
//! - [`time`] – update simulation time and the behavior cadence
//! - [`tween`] – glide positions and hand arrivals to the behavior
//! - [`worldbounds`] – keep bodies on screen and report touched edges

pub mod animation;
pub mod behavior;
pub mod drag;
pub mod hittest;
pub mod movement;
pub mod randombehavior;
pub mod render;
pub mod scheduler;
pub mod sheetloader;
pub mod spawn;
pub mod time;
pub mod tween;
pub mod worldbounds;
