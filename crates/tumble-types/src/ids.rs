//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidentally handing a platform handle to
//! something that expects a sphere, or a material index to an object slot.

use serde::{Deserialize, Serialize};

/// Handle of a solid object owned by the geometry source (static brush,
/// shape, or platform). Non-owning: it is only valid while the source lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Handle of a moving platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Handle of a dynamic sphere body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Index into a scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl ObjectId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PlatformId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ObjectId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for PlatformId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for BodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u16> for MaterialId {
    fn from(val: u16) -> Self {
        Self(val)
    }
}
