//! Control input and move forces.
//!
//! Input is a 2-D move vector expressed in camera axes. The axes depend on
//! camera yaw/pitch and the gravity frame; they are cached in [`MoveAxes`]
//! and recomputed after an explicit [`MoveAxes::invalidate`].

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tumble_types::constants::DIAGONAL_MOVE_BOOST;

use crate::config::BodyConfig;
use crate::profile::ProfileTuning;
use crate::state::BodyState;

/// Player intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInput {
    /// Sideways input in `[-1, 1]`.
    pub move_x: f64,
    /// Forward input in `[-1, 1]`.
    pub move_y: f64,
    pub jump: bool,
    /// Camera yaw (radians).
    pub yaw: f64,
    /// Camera pitch (radians).
    pub pitch: f64,
}

impl ControlInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn forward(amount: f64) -> Self {
        Self {
            move_y: amount,
            ..Self::default()
        }
    }

    #[inline]
    pub fn move_vector(&self) -> DVec2 {
        DVec2::new(self.move_x, self.move_y)
    }
}

/// Camera-relative movement axes, cached per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveAxes {
    side: DVec3,
    motion: DVec3,
    up: DVec3,
    valid: bool,
}

impl MoveAxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces recomputation on the next [`MoveAxes::get`].
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns `(side, motion, up)`, computing them if the cache is stale.
    pub fn get(&mut self, yaw: f64, pitch: f64, gravity_dir: DVec3) -> (DVec3, DVec3, DVec3) {
        if !self.valid {
            let up = -gravity_dir;
            let frame = DQuat::from_rotation_arc(DVec3::Z, up);
            let camera = frame * DQuat::from_rotation_z(yaw) * DQuat::from_rotation_x(pitch);
            let look = camera * DVec3::Y;
            let side = look
                .cross(up)
                .try_normalize()
                .unwrap_or_else(|| camera * DVec3::X);
            self.side = side;
            self.motion = up.cross(side);
            self.up = up;
            self.valid = true;
        }
        (self.side, self.motion, self.up)
    }
}

/// Output of [`compute_move_forces`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveForces {
    /// Angular acceleration requested by input.
    pub a_control: DVec3,
    /// Angular velocity that would roll at the requested speed.
    pub desired_omega: DVec3,
    /// No move input this tick.
    pub is_centered: bool,
}

/// Converts move input into a desired roll and a clipped angular acceleration.
///
/// Pushing in a direction never asks to roll slower along it than the body
/// already does.
pub fn compute_move_forces(
    body: &BodyState,
    config: &BodyConfig,
    tuning: &ProfileTuning,
    input: &ControlInput,
    axes: &mut MoveAxes,
) -> MoveForces {
    let up = -body.gravity_dir;
    let r = up * body.radius;
    let roll_velocity = body.omega.cross(r);

    let (side, motion, _) = axes.get(input.yaw, input.pitch, body.gravity_dir);
    let current = DVec2::new(side.dot(roll_velocity), motion.dot(roll_velocity));

    let mut mv = if body.mode.out_of_bounds {
        DVec2::ZERO
    } else {
        input.move_vector()
    };
    if tuning.diagonal_boost {
        mv *= DIAGONAL_MOVE_BOOST;
        if mv.length() > 1.0 {
            mv = mv.normalize();
        }
    }

    let mut desired = mv * config.max_roll_velocity;
    if desired == DVec2::ZERO {
        return MoveForces {
            a_control: DVec3::ZERO,
            desired_omega: DVec3::ZERO,
            is_centered: true,
        };
    }

    if (current.y > desired.y && desired.y > 0.0) || (current.y < desired.y && desired.y < 0.0) {
        desired.y = current.y;
    }
    if (current.x > desired.x && desired.x > 0.0) || (current.x < desired.x && desired.x < 0.0) {
        desired.x = current.x;
    }

    let new_motion = side * desired.x + motion * desired.y;
    let desired_omega = r.cross(new_motion) / r.length_squared();

    let mut a_control = desired_omega - body.omega;
    let magnitude = a_control.length();
    if magnitude > config.angular_acceleration {
        a_control *= config.angular_acceleration / magnitude;
    }

    MoveForces {
        a_control,
        desired_omega,
        is_centered: false,
    }
}
