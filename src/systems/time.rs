//! Time update systems.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta, and
//! advances the [`BehaviorCadence`](crate::resources::cadence::BehaviorCadence)
//! gate with the same scaled delta.
use bevy_ecs::prelude::*;

use crate::resources::cadence::BehaviorCadence;
use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled frame delta in seconds. The system
/// applies the current `time_scale` and writes both `elapsed` and `delta`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let scaled_dt = {
        let mut wt = world.resource_mut::<WorldTime>();
        let scaled_dt = dt.max(0.0) * wt.time_scale;
        wt.elapsed += scaled_dt;
        wt.delta = scaled_dt;
        scaled_dt
    };
    if let Some(mut cadence) = world.get_resource_mut::<BehaviorCadence>() {
        cadence.advance(scaled_dt);
    }
}

/// Run condition: this frame is a behavior tick.
pub fn cadence_ready(cadence: Res<BehaviorCadence>) -> bool {
    cadence.ready
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_delta_and_opens_cadence() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            time_scale: 2.0,
            ..WorldTime::default()
        });
        world.insert_resource(BehaviorCadence::new(0.1));

        update_world_time(&mut world, 0.02);
        assert!((world.resource::<WorldTime>().elapsed - 0.04).abs() < 1e-6);
        assert!(!world.resource::<BehaviorCadence>().ready);

        update_world_time(&mut world, 0.04);
        assert!((world.resource::<WorldTime>().delta - 0.08).abs() < 1e-6);
        assert!(world.resource::<BehaviorCadence>().ready);
    }
}
