//! Numeric thresholds and simulation defaults.
//!
//! Gameplay feel depends on these exact values. Several are the f32
//! roundings of decimal constants and are written out in full on purpose.

use crate::scalar::Scalar;

/// Default gravitational acceleration magnitude (units/s²).
pub const GRAVITY: Scalar = 20.0;

/// Default simulation tick (seconds).
pub const DEFAULT_TICK: Scalar = 0.032;

/// Maximum sub-step length: 8 ms as stored in single precision.
pub const MAX_SUBSTEP: Scalar = 0.00800000037997961;

/// Sub-step iterations allowed by the iteration-capped profiles (`it <= 10`).
pub const PROFILE_ITERATION_CAP: u32 = 11;

/// Universal sub-step safety cap applied to every profile.
pub const SUBSTEP_SAFETY_CAP: u32 = 64;

/// Sweeps slower than this never collide.
pub const MIN_SWEEP_SPEED: Scalar = 0.001;

/// `plane · direction` above this means the sweep is not heading into the plane.
pub const FACING_TOLERANCE: Scalar = 0.001;

/// Late root of an edge/corner quadratic must exceed this to count.
pub const ROOT_EPSILON: Scalar = 0.0001;

/// Slack added to the radius when gathering contacts.
pub const CONTACT_EPSILON: Scalar = 0.0001;

/// Factor on the squared reach (sum of radii) within which two spheres are in
/// contact; about 0.5% slack in radius terms.
pub const SPHERE_CONTACT_SLACK: Scalar = 1.01;

/// Relaxed penetration threshold used on repeated cancellation passes.
pub const SURFACE_DOT_THRESHOLD: Scalar = 0.0001;

/// Hard cap on velocity-cancellation passes.
pub const CANCEL_PASS_CAP: u32 = 20;

/// Pass count after which platforms touching the body are stopped.
pub const PLATFORM_STOP_PASSES: u32 = 6;

/// Push-out only runs below this squared speed (25²).
pub const PUSH_OUT_SPEED_SQ: Scalar = 625.0;

/// Slack added around the body box when querying geometry for a sweep.
pub const SWEEP_BOX_SLACK: Scalar = 0.5;

/// Per-second inflation of the tick's extruded box.
pub const TICK_BOX_SLACK_RATE: Scalar = 25.0;

/// Velocity expansion factor for the tick's extruded box.
pub const TICK_BOX_VELOCITY_SCALE: Scalar = 1.100000023841858;

/// Diagonal move boost for non-Mbg profiles.
pub const DIAGONAL_MOVE_BOOST: Scalar = 1.538461565971375;

/// Linear drag applied while movement is disabled.
pub const DISABLED_DRAG: Scalar = 16.0;
