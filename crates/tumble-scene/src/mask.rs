//! Object-type masks for geometry queries.

use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

/// Bit set of object categories a query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectMask(pub u32);

impl ObjectMask {
    pub const NONE: Self = Self(0);
    /// Static level geometry.
    pub const INTERIOR: Self = Self(1 << 0);
    /// Moving platforms.
    pub const PLATFORM: Self = Self(1 << 1);
    /// Static shapes that receive collision notifications.
    pub const SHAPE: Self = Self(1 << 2);
    /// Other dynamic spheres.
    pub const BODY: Self = Self(1 << 3);

    /// Everything a rolling body collides with.
    pub const COLLISION: Self = Self(Self::INTERIOR.0 | Self::PLATFORM.0 | Self::SHAPE.0 | Self::BODY.0);

    /// Returns true if every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any bit of `other` is set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ObjectMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for ObjectMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
