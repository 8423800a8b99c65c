//! Event types exchanged between systems and the behavior observers.
//!
//! Events decouple the physics/input side (which notices things) from the
//! behavior controller (which decides what to do about them). Observers for
//! these events live next to the systems that own the related logic.
//!
//! Submodules:
//! - [`animation`] – a finite clip finished playing
//! - [`drag`] – pointer drag and release
//! - [`tween`] – a position tween arrived
//! - [`worldbounds`] – a body newly touched world edges
pub mod animation;
pub mod drag;
pub mod tween;
pub mod worldbounds;
