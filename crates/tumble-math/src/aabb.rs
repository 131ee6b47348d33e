//! Axis-aligned bounding boxes.
//!
//! Boxes are used for geometry queries, the query cache key and the
//! per-tick platform working-set test.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// The degenerate box at the origin.
    pub const ZERO: Self = Self {
        min: DVec3::ZERO,
        max: DVec3::ZERO,
    };

    /// Creates a box from its two corners.
    #[inline]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box enclosing a sphere.
    #[inline]
    pub fn around_sphere(center: DVec3, radius: f64) -> Self {
        Self {
            min: center - DVec3::splat(radius),
            max: center + DVec3::splat(radius),
        }
    }

    /// Smallest box enclosing every point. Returns `None` for an empty slice.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let mut aabb = Self::new(first, first);
        for &p in &points[1..] {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    /// Box grown by `amount` on every side.
    #[inline]
    pub fn inflated(&self, amount: f64) -> Self {
        Self {
            min: self.min - DVec3::splat(amount),
            max: self.max + DVec3::splat(amount),
        }
    }

    /// Box extended only on the side each component of `displacement` points to.
    ///
    /// This is the swept box of a moving volume: the far side of each axis
    /// moves, the near side stays.
    pub fn swept(&self, displacement: DVec3) -> Self {
        let mut out = *self;
        for axis in 0..3 {
            let d = displacement[axis];
            if d >= 0.0 {
                out.max[axis] += d;
            } else {
                out.min[axis] += d;
            }
        }
        out
    }

    /// Box moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Union of two boxes.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns true if the boxes touch or overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns true if `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Returns true if the point lies inside or on the box.
    #[inline]
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}
