//! The geometry query collaborator.
//!
//! The collision core never owns world geometry. It asks a
//! [`GeometrySource`] for everything inside a box, receives a polygon soup
//! plus nearby spheres, and talks to moving platforms through
//! [`MovingPlatform`].

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_material::Coefficients;
use tumble_math::Aabb;
use tumble_types::{BodyId, MaterialId, PlatformId};

use crate::mask::ObjectMask;
use crate::platform::MovingPlatform;
use crate::soup::PolySoup;

/// Another dynamic sphere as seen by the querying body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereProxy {
    pub id: BodyId,
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
    pub mass: f64,
    /// Bounce restitution of that body; sphere impacts use the larger of the two.
    pub bounce_restitution: f64,
}

/// Result of one box query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub soup: PolySoup,
    pub spheres: Vec<SphereProxy>,
}

impl QueryResult {
    pub fn clear(&mut self) {
        self.soup.clear();
        self.spheres.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.soup.is_empty() && self.spheres.is_empty()
    }
}

/// World geometry seen through box queries.
///
/// Implementations must be non-blocking in-memory lookups; the collision core
/// calls them many times per tick.
pub trait GeometrySource {
    /// Appends every polygon and sphere inside `bounds` matching `mask` to `out`.
    ///
    /// Platform polygons are only included when `include_platforms` is set.
    /// The sphere with id `exclude` (the querying body) is never returned.
    fn query(
        &self,
        bounds: &Aabb,
        mask: ObjectMask,
        include_platforms: bool,
        exclude: Option<BodyId>,
        out: &mut QueryResult,
    );

    /// Coefficients of a material, `None` if the id is unknown.
    fn material(&self, id: MaterialId) -> Option<Coefficients>;

    /// Sum of field forces acting on a body at `position`.
    fn force_at(&self, _position: DVec3, _radius: f64) -> DVec3 {
        DVec3::ZERO
    }

    /// Overwrites the velocity of another dynamic sphere.
    fn set_sphere_velocity(&mut self, _id: BodyId, _velocity: DVec3) {}

    /// Ids of every moving platform in the world.
    fn platform_ids(&self) -> Vec<PlatformId> {
        Vec::new()
    }

    fn platform(&self, _id: PlatformId) -> Option<&dyn MovingPlatform> {
        None
    }

    fn platform_mut(&mut self, _id: PlatformId) -> Option<&mut dyn MovingPlatform> {
        None
    }

    /// Returns the source name (for logging).
    fn name(&self) -> &str;
}
