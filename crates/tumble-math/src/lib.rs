//! # tumble-math
//!
//! Geometry primitives for the tumble collision core.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DVec2`, `DQuat`)
//! - Axis-aligned boxes with directional sweep expansion
//! - Planes in `n · p + d = 0` form, including polygon edge planes
//! - Ordered quadratic roots and the moving-sphere overlap test

pub mod aabb;
pub mod plane;
pub mod roots;

pub use aabb::Aabb;
pub use plane::Plane;
pub use roots::{capsule_sphere_nearest_overlap, ordered_roots};

// Re-export glam types as the canonical math types for tumble.
pub use glam::{DQuat, DVec2, DVec3};
