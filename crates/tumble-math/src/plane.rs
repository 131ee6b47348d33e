//! Planes in Hessian normal form.
//!
//! A plane stores a unit normal `n` and offset `d` with `n · p + d = 0` for
//! every point `p` on it. Signed distance is positive on the normal side.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// An oriented plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: DVec3,
    /// Offset: `n · p + d = 0` on the plane.
    pub d: f64,
}

/// Cross products shorter than this are treated as degenerate.
const DEGENERATE_LENGTH: f64 = 1e-12;

impl Plane {
    /// Plane through `point` with the given normal (normalized here).
    ///
    /// Returns `None` if the normal has zero length.
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self {
            normal,
            d: -normal.dot(point),
        })
    }

    /// Plane through three points, normal `(b - a) × (c - a)`.
    ///
    /// Counter-clockwise points seen from the normal side. Returns `None` for
    /// collinear input.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let n = (b - a).cross(c - a);
        if n.length_squared() < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
            return None;
        }
        Self::from_point_normal(a, n)
    }

    /// Plane containing the polygon edge `prev → vertex` and `face_normal`,
    /// facing into a counter-clockwise polygon.
    ///
    /// Returns `None` for a zero-length edge.
    pub fn edge_plane(face_normal: DVec3, prev: DVec3, vertex: DVec3) -> Option<Self> {
        let inward = face_normal.cross(vertex - prev);
        if inward.length_squared() < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
            return None;
        }
        Self::from_point_normal(vertex, inward)
    }

    /// Signed distance from `p` to the plane.
    #[inline]
    pub fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) + self.d
    }

    /// Closest point on the plane to `p`.
    #[inline]
    pub fn project(&self, p: DVec3) -> DVec3 {
        p - self.normal * self.distance(p)
    }

    /// Plane moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            normal: self.normal,
            d: self.d - self.normal.dot(offset),
        }
    }
}
