use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::resources::worldtime::WorldTime;

/// Integrate enabled forces into velocity and velocity into position.
///
/// Frozen bodies (dragged, tweened or paused companions) are left alone.
pub fn movement(mut query: Query<(&mut MapPosition, &mut RigidBody)>, time: Res<WorldTime>) {
    let dt = time.delta;
    for (mut position, mut rigidbody) in query.iter_mut() {
        if rigidbody.frozen {
            continue;
        }
        let acceleration = rigidbody.total_acceleration();
        rigidbody.velocity += acceleration.scale_by(dt);
        let delta = rigidbody.velocity.scale_by(dt);
        position.pos += delta;
    }
}
