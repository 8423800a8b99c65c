//! Fixed-rate gate for expensive or stochastic per-companion work.

use bevy_ecs::prelude::Resource;

/// Logical behavior updates per second.
pub const BEHAVIOR_TICK_RATE: f32 = 9.0;

/// Accumulates frame time and opens once per `interval`.
///
/// At most one tick fires per frame; long frames do not queue a burst of
/// catch-up ticks.
#[derive(Resource, Debug, Clone, Copy)]
pub struct BehaviorCadence {
    pub interval: f32,
    pub accumulated: f32,
    pub ready: bool,
}

impl Default for BehaviorCadence {
    fn default() -> Self {
        Self::new(1.0 / BEHAVIOR_TICK_RATE)
    }
}

impl BehaviorCadence {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            ready: false,
        }
    }

    /// Add frame time; returns whether this frame is a behavior tick.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        self.ready = self.accumulated >= self.interval;
        if self.ready {
            self.accumulated = 0.0;
        }
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut cadence = BehaviorCadence::new(0.1);
        let fired = (0..10).filter(|_| cadence.advance(1.0 / 60.0)).count();
        assert_eq!(fired, 1);
        assert!(cadence.advance(1.0));
        assert!(!cadence.advance(0.0));
    }
}
