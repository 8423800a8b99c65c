//! Kinematic body component with named acceleration forces.
//!
//! The [`RigidBody`] component stores velocity and named acceleration forces
//! for a companion. Behaviors toggle forces individually: `"gravity"` is on
//! unless the companion is climbing or crawling, and `"motor"` carries the
//! extra downward push used while jumping.
//!
//! The `frozen` flag disables all movement and world-bounds handling. It is
//! set while the position is driven externally (drag, jump arcs, pauses).

use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;
use rustc_hash::FxHashMap;

pub const GRAVITY_FORCE: &str = "gravity";
pub const MOTOR_FORCE: &str = "motor";

/// A named acceleration force that can be toggled on/off.
#[derive(Clone, Copy, Debug)]
pub struct AccelerationForce {
    /// The acceleration vector in world units per second squared.
    pub value: Vector2,
    /// Whether this force is currently active.
    pub enabled: bool,
}

impl AccelerationForce {
    pub fn new(value: Vector2) -> Self {
        Self {
            value,
            enabled: true,
        }
    }
}

/// Which world edges the body is currently pressed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsContact {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl BoundsContact {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Sides present in `self` but not in `previous`.
    pub fn entered_since(&self, previous: BoundsContact) -> BoundsContact {
        BoundsContact {
            up: self.up && !previous.up,
            down: self.down && !previous.down,
            left: self.left && !previous.left,
            right: self.right && !previous.right,
        }
    }
}

/// Kinematic body storing velocity, named forces and world-bounds state.
#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vector2,
    /// Named acceleration forces. The total acceleration is the sum of all enabled forces.
    pub forces: FxHashMap<String, AccelerationForce>,
    /// When false the body passes through the world edges.
    pub collide_world_bounds: bool,
    /// Edges touched at the end of the last bounds check.
    pub contact: BoundsContact,
    /// When true, movement and bounds systems skip this entity.
    pub frozen: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Create a RigidBody with zero velocity and no forces.
    pub fn new() -> Self {
        Self {
            velocity: Vector2 { x: 0.0, y: 0.0 },
            forces: FxHashMap::default(),
            collide_world_bounds: true,
            contact: BoundsContact::default(),
            frozen: false,
        }
    }

    /// Body set up for a companion: gravity on, motor idle.
    pub fn with_gravity(gravity: f32) -> Self {
        let mut rb = Self::new();
        rb.add_force(GRAVITY_FORCE, Vector2 { x: 0.0, y: gravity });
        rb.add_force(MOTOR_FORCE, Vector2 { x: 0.0, y: 0.0 });
        rb
    }

    /// Add or update a named acceleration force (enabled by default).
    pub fn add_force(&mut self, name: &str, value: Vector2) {
        self.forces
            .insert(name.to_string(), AccelerationForce::new(value));
    }

    /// Enable or disable a specific force by name.
    /// Returns false if the force doesn't exist.
    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(force) = self.forces.get_mut(name) {
            force.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Check if a force exists and is enabled.
    pub fn is_force_enabled(&self, name: &str) -> bool {
        self.forces.get(name).map(|f| f.enabled).unwrap_or(false)
    }

    /// Update the value of an existing force, creating it if missing.
    pub fn set_force_value(&mut self, name: &str, value: Vector2) {
        match self.forces.get_mut(name) {
            Some(force) => force.value = value,
            None => self.add_force(name, value),
        }
    }

    pub fn get_force(&self, name: &str) -> Option<&AccelerationForce> {
        self.forces.get(name)
    }

    /// Calculate the total acceleration from all enabled forces.
    pub fn total_acceleration(&self) -> Vector2 {
        let mut total = Vector2 { x: 0.0, y: 0.0 };
        for force in self.forces.values() {
            if force.enabled {
                total += force.value;
            }
        }
        total
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    pub fn gravity_enabled(&self) -> bool {
        self.is_force_enabled(GRAVITY_FORCE)
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.set_force_enabled(GRAVITY_FORCE, enabled);
    }

    /// Set the motor (non-gravity) acceleration.
    pub fn set_acceleration(&mut self, acceleration: Vector2) {
        self.set_force_value(MOTOR_FORCE, acceleration);
    }

    /// Whether world-edge clamping and events apply right now.
    pub fn collides_with_world_bounds(&self) -> bool {
        self.collide_world_bounds && !self.frozen
    }

    /// Freeze the rigid body: no integration, no world bounds.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}
