//! Contact response.
//!
//! Two passes run against the manifold each sub-step:
//!
//! 1. [`velocity_cancel`] removes or reflects the velocity driving the body
//!    into its contacts (bounces, soft landings, slides, sphere exchanges).
//! 2. [`apply_contact_forces`] picks the best supporting contact and resolves
//!    rolling and sliding friction against it, producing the linear and
//!    angular accelerations for the sub-step.

use glam::DVec3;
use tumble_math::Aabb;
use tumble_scene::GeometrySource;
use tumble_solver::{BodyConfig, BodyState, ControlInput, Modifiers, MoveForces, ProfileTuning};
use tumble_telemetry::{BounceStrength, EventKind};
use tumble_types::{constants, PlatformId};

use crate::contact::{Contact, ContactSource};

/// Tuning shared by both response passes.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub config: &'a BodyConfig,
    pub tuning: &'a ProfileTuning,
    pub modifiers: &'a Modifiers,
}

/// Flags that outlive a single cancellation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelFlags {
    /// A penetrating contact was already corrected this tick.
    pub bounced_yet: bool,
    /// Platforms were already stopped this sub-step.
    pub stopped_paths: bool,
}

/// What one cancellation call did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CancelReport {
    pub passes: u32,
    /// Contacts corrected, summed over all passes.
    pub corrections: u32,
    /// Gave up with contacts still penetrating.
    pub capped: bool,
    /// Distance moved by the positional push-out.
    pub push_out: f64,
}

/// Classifies an impact speed against the body's effect thresholds.
pub fn bounce_strength(config: &BodyConfig, speed: f64) -> BounceStrength {
    if speed >= config.min_hard_bounce_speed {
        BounceStrength::Hard
    } else if speed >= config.min_medium_bounce_speed {
        BounceStrength::Medium
    } else if speed >= config.min_bounce_speed {
        BounceStrength::Soft
    } else {
        BounceStrength::None
    }
}

/// Removes penetrating velocity at every contact.
///
/// Repeats over the manifold until no contact needs correcting or the pass
/// cap is hit. The first pass corrects anything closing at all; later passes
/// tolerate closing speeds up to [`constants::SURFACE_DOT_THRESHOLD`]. After
/// [`constants::PLATFORM_STOP_PASSES`] passes, surface velocities are zeroed
/// and platforms touching the body are told to stop. Residual penetration is
/// finally corrected by moving the body along the averaged contact normals.
#[allow(clippy::too_many_arguments)]
pub fn velocity_cancel(
    body: &mut BodyState,
    contacts: &mut [Contact],
    ctx: &ResponseContext<'_>,
    mut surface_slide: bool,
    no_bounce: bool,
    flags: &mut CancelFlags,
    working_set: &[PlatformId],
    source: &mut dyn GeometrySource,
    events: &mut Vec<EventKind>,
) -> CancelReport {
    let config = ctx.config;
    let mut report = CancelReport::default();
    let mut looped = false;

    loop {
        let mut done = true;
        report.passes += 1;

        for contact in contacts.iter_mut() {
            let relative = body.velocity - contact.surface_velocity;
            let surface_dot = contact.normal.dot(relative);
            let penetrating = (!looped && surface_dot < 0.0)
                || surface_dot < -constants::SURFACE_DOT_THRESHOLD;
            if !penetrating {
                continue;
            }

            let speed = body.velocity.length();
            let normal_part = contact.normal * surface_dot;

            if !flags.bounced_yet {
                flags.bounced_yet = true;
                let strength = bounce_strength(config, -surface_dot);
                if strength != BounceStrength::None {
                    events.push(EventKind::Bounce {
                        speed: -surface_dot,
                        normal: contact.normal.to_array(),
                        material: contact.material.map(|m| m.0),
                        strength,
                    });
                }
            }

            if no_bounce {
                body.velocity -= normal_part;
            } else if let ContactSource::Body {
                id,
                mass: other_mass,
                bounce_restitution,
            } = contact.source
            {
                let bounce = config.bounce_restitution.max(bounce_restitution);
                let other_velocity = contact.surface_velocity;
                let reduced_mass = body.mass * other_mass / (body.mass + other_mass);
                let exchange = contact.normal * (surface_dot * reduced_mass * (bounce + 1.0));
                body.velocity -= exchange / body.mass;
                let other_velocity = other_velocity + exchange / other_mass;
                source.set_sphere_velocity(id, other_velocity);
                contact.surface_velocity = other_velocity;
            } else if slide_allowed(ctx, contact, surface_slide)
                && surface_dot > -config.max_dot_slide * speed
            {
                body.velocity -= normal_part;
                body.velocity = body.velocity.normalize_or_zero() * speed;
                surface_slide = true;
            } else if surface_dot >= -config.min_bounce_vel {
                body.velocity -= normal_part;
            } else {
                bounce_off(body, contact, ctx, relative, surface_dot);
            }

            report.corrections += 1;
            done = false;
        }

        looped = true;

        if report.passes > constants::PLATFORM_STOP_PASSES && !flags.stopped_paths {
            flags.stopped_paths = true;
            if no_bounce {
                done = true;
            }
            for contact in contacts.iter_mut() {
                contact.surface_velocity = DVec3::ZERO;
            }
            let body_box = Aabb::around_sphere(body.position, body.radius);
            for &id in working_set {
                if let Some(platform) = source.platform_mut(id) {
                    if platform.extruded_box().overlaps(&body_box) {
                        platform.set_stopped();
                    }
                }
            }
            tracing::debug!(passes = report.passes, "stopping platforms under a wedged body");
        }

        if done {
            break;
        }
        if report.passes >= constants::CANCEL_PASS_CAP {
            report.capped = true;
            tracing::debug!(
                passes = report.passes,
                contacts = contacts.len(),
                "velocity cancellation hit the pass cap"
            );
            events.push(EventKind::ContactPassCapReached {
                passes: report.passes,
            });
            break;
        }
    }

    if body.velocity.length_squared() < constants::PUSH_OUT_SPEED_SQ {
        report.push_out = push_out(body, contacts);
    }

    report
}

/// Whether a shallow hit may turn into a slide rather than a bounce.
fn slide_allowed(ctx: &ResponseContext<'_>, contact: &Contact, surface_slide: bool) -> bool {
    if surface_slide {
        return false;
    }
    let surface_speed = contact.surface_velocity.length();
    if ctx.tuning.slide_requires_moving_surface {
        surface_speed > constants::SURFACE_DOT_THRESHOLD
    } else {
        surface_speed == 0.0
    }
}

/// Reflects the normal velocity with restitution and converts part of the
/// slip at the contact point into spin.
fn bounce_off(
    body: &mut BodyState,
    contact: &Contact,
    ctx: &ResponseContext<'_>,
    relative: DVec3,
    surface_dot: f64,
) {
    let restitution = contact.restitution * ctx.modifiers.bounce(ctx.config);
    let velocity_add = -(1.0 + restitution) * contact.normal * surface_dot;
    let lever = -contact.normal * body.radius;
    let normal_speed = -surface_dot;

    let mut slip = relative + body.omega.cross(lever);
    slip -= contact.normal * contact.normal.dot(relative);

    let slip_speed = slip.length();
    if slip_speed != 0.0 {
        let friction = ctx.config.bounce_kinetic_friction * contact.friction;
        let spin = (friction * 5.0 * normal_speed / (2.0 * body.radius)).min(slip_speed / body.radius);
        let slip_dir = slip / slip_speed;
        let delta_omega = spin * (-contact.normal).cross(-slip_dir);
        body.omega += delta_omega;
        body.velocity -= (-delta_omega).cross(lever);
    }
    body.velocity += velocity_add;
}

/// Moves the body out of residual penetration along the averaged normal.
///
/// Returns the distance moved, at most one radius. Contact distances are
/// updated so a later call in the same sub-step does not push twice.
fn push_out(body: &mut BodyState, contacts: &mut [Contact]) -> f64 {
    if contacts.is_empty() {
        return 0.0;
    }
    let mut dir = DVec3::ZERO;
    for contact in contacts.iter() {
        let mut next = dir + contact.normal;
        // Opposing normals cancel; lean toward the newer one.
        if next.length_squared() < 0.01 {
            next += contact.normal;
        }
        dir = next;
    }
    let Some(dir) = dir.try_normalize() else {
        return 0.0;
    };

    let mut so_far = 0.0_f64;
    for contact in contacts.iter() {
        if body.radius <= contact.distance {
            continue;
        }
        let along = contact.normal.dot(dir);
        if along <= constants::SURFACE_DOT_THRESHOLD {
            continue;
        }
        let depth = body.radius - contact.distance;
        let remaining = depth - so_far * along;
        if remaining > 0.0 {
            so_far += remaining / along;
        }
    }

    let so_far = so_far.clamp(0.0, body.radius);
    if so_far > 0.0 {
        body.position += dir * so_far;
        for contact in contacts.iter_mut() {
            contact.distance += so_far * contact.normal.dot(dir);
        }
    }
    so_far
}

/// Contact-force outputs that survive a sub-step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceReport {
    /// Slip speed left at the support contact after friction, if slipping
    /// was evaluated this call.
    pub slip: Option<f64>,
    /// Jump impulse added, if any.
    pub jump: Option<f64>,
}

/// Resolves friction, rolling and jumping against the best contact.
///
/// `linear` enters holding the external acceleration and leaves with support
/// and friction added; `angular` receives the angular acceleration. `best`
/// is the integrator's cached support contact; it is only refreshed while
/// movement is enabled.
#[allow(clippy::too_many_arguments)]
pub fn apply_contact_forces(
    body: &mut BodyState,
    contacts: &mut [Contact],
    best: &mut Option<Contact>,
    ctx: &ResponseContext<'_>,
    input: &ControlInput,
    moves: &MoveForces,
    step: f64,
    linear: &mut DVec3,
    angular: &mut DVec3,
    events: &mut Vec<EventKind>,
) -> ForceReport {
    let config = ctx.config;
    let mut report = ForceReport::default();
    let movable = body.mode.movement_enabled;
    let restricted = body.mode.axis_restricted;

    let mut strongest = 0.0;
    let mut best_index = None;
    for (i, contact) in contacts.iter_mut().enumerate() {
        if contact.source.is_body() {
            continue;
        }
        contact.normal_force = -contact.normal.dot(*linear);
        if contact.normal_force > strongest {
            strongest = contact.normal_force;
            best_index = Some(i);
        }
    }

    if let Some(i) = best_index {
        if movable {
            *best = Some(contacts[i]);
        }
    }

    if input.jump && best_index.is_some() {
        if let Some(support) = best.as_ref() {
            let along = support.normal_velocity(body.velocity);
            if config.jump_impulse > along {
                let impulse = config.jump_impulse - along;
                body.velocity += support.normal * impulse;
                report.jump = Some(impulse);
                events.push(EventKind::Jump { impulse });
            }
        }
    }

    if ctx.tuning.surface_support {
        for contact in contacts.iter() {
            let normal_force = -contact.normal.dot(*linear);
            if normal_force > 0.0 && contact.normal_velocity(body.velocity) <= constants::SURFACE_DOT_THRESHOLD {
                *linear += contact.normal * normal_force;
            }
        }
    }

    let mut a_control = moves.a_control;

    if let (Some(_), true, Some(support)) = (best_index, movable, best.as_ref()) {
        let lever = -support.normal * body.radius;
        let slip = body.velocity + body.omega.cross(lever) - support.surface_velocity;
        let slip_speed = slip.length();

        let mut slipping = false;
        let mut a_friction = DVec3::ZERO;
        let mut linear_friction = DVec3::ZERO;

        if slip_speed != 0.0 {
            slipping = true;
            let friction = if restricted {
                0.0
            } else {
                config.kinetic_friction * support.friction
            };
            let mut spin = friction * 5.0 * support.normal_force / (2.0 * body.radius);
            let mut drag = support.normal_force * friction;
            let total = (body.radius * spin + drag) * step;
            if slip_speed < total {
                slipping = false;
                spin *= slip_speed / total;
                drag *= slip_speed / total;
            }
            let slip_dir = slip / slip_speed;
            a_friction = spin * (-support.normal).cross(-slip_dir);
            linear_friction = -drag * slip_dir;
            report.slip = Some(slip_speed - total);
        }

        if !slipping {
            let r = -body.gravity_dir * body.radius;
            let roll = r.cross(*linear) / r.length_squared();

            if moves.is_centered {
                let next_omega = body.omega + *angular * step;
                a_control = moves.desired_omega - next_omega;
                let magnitude = a_control.length();
                if config.braking_acceleration < magnitude {
                    a_control *= config.braking_acceleration / magnitude;
                }
            }

            let mut steer = -a_control.cross(lever);
            let demand = (roll.cross(lever) + steer).length();
            let grip = if restricted {
                0.0
            } else {
                config.static_friction * support.friction
            };
            if grip * support.normal_force < demand {
                let kinetic = if restricted {
                    0.0
                } else {
                    config.kinetic_friction * support.friction
                };
                steer *= kinetic * support.normal_force / demand;
            }

            *linear += steer;
            *angular += roll;
        }

        *linear += linear_friction;
        *angular += a_friction;
    }

    *angular += a_control;
    report
}
