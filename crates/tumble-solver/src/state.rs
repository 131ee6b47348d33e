//! Body state: the only data the physics core mutates permanently.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_types::BodyId;

use crate::config::{BodyConfig, Modifiers};

/// Mode flags set by gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// Off: no gravity, no friction or control; velocity decays with drag.
    pub movement_enabled: bool,
    /// On: no friction, no air control; velocity is clamped after integration.
    pub axis_restricted: bool,
    /// On: control input is ignored but physics keeps running.
    pub out_of_bounds: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            movement_enabled: true,
            axis_restricted: false,
            out_of_bounds: false,
        }
    }
}

/// State of one rolling sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub id: BodyId,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Angular velocity (rad/s).
    pub omega: DVec3,
    pub radius: f64,
    pub mass: f64,
    /// Position at the start of the last tick, for render interpolation.
    pub prev_position: DVec3,
    /// Unit vector gravity pulls along.
    pub gravity_dir: DVec3,
    pub mode: ModeFlags,
}

impl BodyState {
    /// A body at rest at `position` with the config's radius and mass.
    pub fn new(id: BodyId, config: &BodyConfig, position: DVec3) -> Self {
        Self {
            id,
            position,
            velocity: DVec3::ZERO,
            omega: DVec3::ZERO,
            radius: config.radius,
            mass: config.mass(),
            prev_position: position,
            gravity_dir: DVec3::NEG_Z,
            mode: ModeFlags::default(),
        }
    }

    /// Re-derives the mass after a modifier change.
    pub fn apply_modifiers(&mut self, config: &BodyConfig, modifiers: &Modifiers) {
        self.mass = config.mass() * modifiers.mass_scale;
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Linear plus rotational kinetic energy (solid sphere, I = 2/5 m r²).
    pub fn kinetic_energy(&self) -> f64 {
        let inertia = 0.4 * self.mass * self.radius * self.radius;
        0.5 * self.mass * self.velocity.length_squared() + 0.5 * inertia * self.omega.length_squared()
    }

    /// Height along the up direction (against gravity).
    pub fn height(&self) -> f64 {
        -self.position.dot(self.gravity_dir)
    }

    /// Interpolated render position between the last two ticks, `alpha` in `[0, 1]`.
    pub fn render_position(&self, alpha: f64) -> DVec3 {
        self.prev_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}
