//! Scalar type alias for the simulation.
//!
//! Collision and contact math runs in double precision so that error
//! does not accumulate across the many candidate polygons a single
//! query can return.

/// The floating-point type used for body state and all TOI math.
pub type Scalar = f64;
