use glam::Quat;
use hecs::World;

use crate::components::{Spin, Transform};

/// Advances every `Spin` entity's rotation by `dt` seconds.
pub fn spin_system(world: &mut World, dt: f32) {
    for (_entity, (transform, spin)) in world.query_mut::<(&mut Transform, &Spin)>() {
        let Some(axis) = spin.axis.try_normalize() else {
            continue;
        };
        let step = Quat::from_axis_angle(axis, (spin.degrees_per_second * dt).to_radians());
        transform.rotation = (step * transform.rotation).normalize();
    }
}
