//! External accelerations acting on the body before contact response.

use glam::DVec3;
use tumble_scene::GeometrySource;
use tumble_solver::{BodyConfig, BodyState, ControlInput, Modifiers, MoveAxes};
use tumble_types::constants;

use crate::contact::Contact;

/// Gravity, force fields, force materials and air control, as an
/// acceleration.
///
/// With movement disabled the only force is a linear drag that bleeds off
/// velocity. Force materials push along the averaged normal of every contact
/// that carries a force, with the magnitude of the last one found.
#[allow(clippy::too_many_arguments)]
pub fn external_forces(
    body: &BodyState,
    contacts: &[Contact],
    config: &BodyConfig,
    modifiers: &Modifiers,
    input: &ControlInput,
    axes: &mut MoveAxes,
    source: &dyn GeometrySource,
    step: f64,
) -> DVec3 {
    if !body.mode.movement_enabled {
        return body.velocity * -constants::DISABLED_DRAG;
    }

    let mut acceleration = body.gravity_dir * config.gravity * modifiers.gravity_scale;
    acceleration += source.force_at(body.position, config.max_force_radius) / body.mass;

    let mut pushing = 0_u32;
    let mut push_normal = DVec3::ZERO;
    let mut push_force = 0.0;
    for contact in contacts.iter().filter(|c| c.force != 0.0) {
        pushing += 1;
        push_normal += contact.normal;
        push_force = contact.force;
    }
    if pushing > 0 {
        let push_normal = push_normal.normalize_or_zero();
        let mut per_mass = push_force / body.mass;
        let outward = body.velocity.dot(push_normal);
        if per_mass > outward {
            if outward > 0.0 {
                per_mass -= outward;
            }
            acceleration += push_normal * (per_mass / step);
        }
    }

    if contacts.is_empty() && !body.mode.axis_restricted {
        let (side, motion, _) = axes.get(input.yaw, input.pitch, body.gravity_dir);
        let steer = side * input.move_x + motion * input.move_y;
        acceleration += steer * modifiers.air_acceleration(config);
    }

    acceleration
}
