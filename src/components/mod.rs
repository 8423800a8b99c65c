//! ECS components for companion entities.
//!
//! Submodules overview:
//! - [`animation`] – playback state of the clip an entity is showing
//! - [`companion`] – behavior record: state, direction, facing, cooldowns
//! - [`draggable`] – pointer-drag marker and active drag state
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`rigidbody`] – kinematic body with named forces and world-bounds contact
//! - [`scale`] – 2D scale factor for sprites
//! - [`sprite`] – 2D sprite-sheet frame, pivot and flip
//! - [`tween`] – timed position interpolation with a completion purpose

pub mod animation;
pub mod companion;
pub mod draggable;
pub mod mapposition;
pub mod rigidbody;
pub mod scale;
pub mod sprite;
pub mod tween;
