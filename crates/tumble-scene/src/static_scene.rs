//! In-memory reference scene.
//!
//! Holds static objects as pre-built polygon soups, a list of shuttling
//! platforms, other dynamic spheres and radial force fields. Queries are a
//! linear scan with per-object and per-polygon box culling, which is enough
//! for tests, benchmarks and the CLI.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_material::{Coefficients, SurfaceMaterial};
use tumble_math::Aabb;
use tumble_types::{BodyId, MaterialId, ObjectId, PlatformId, TumbleError, TumbleResult};

use crate::mask::ObjectMask;
use crate::platform::{LinearPlatform, MovingPlatform};
use crate::soup::{ObjectKind, PolySoup};
use crate::source::{GeometrySource, QueryResult, SphereProxy};

/// A field pushing bodies away from (positive strength) or towards its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialForce {
    pub center: DVec3,
    pub strength: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
struct StaticObject {
    kind: ObjectKind,
    soup: PolySoup,
    bounds: Aabb,
}

/// Reference [`GeometrySource`] backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    materials: Vec<SurfaceMaterial>,
    objects: Vec<StaticObject>,
    platforms: Vec<LinearPlatform>,
    spheres: Vec<SphereProxy>,
    forces: Vec<RadialForce>,
    next_object: u32,
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material and returns its id.
    pub fn add_material(&mut self, material: SurfaceMaterial) -> TumbleResult<MaterialId> {
        material.validate()?;
        let id = u16::try_from(self.materials.len())
            .map_err(|_| TumbleError::InvalidScene("too many materials".into()))?;
        self.materials.push(material);
        Ok(MaterialId(id))
    }

    /// Id of a registered material by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| MaterialId(i as u16))
    }

    fn allocate_object(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        id
    }

    /// Adds an immobile object made of convex polygons.
    pub fn add_object(
        &mut self,
        shape: bool,
        material: Option<MaterialId>,
        polygons: &[Vec<DVec3>],
    ) -> TumbleResult<ObjectId> {
        let id = self.allocate_object();
        let kind = if shape { ObjectKind::Shape } else { ObjectKind::Interior };
        let soup = build_soup(id, kind, material, polygons)?;
        let bounds = soup
            .bounds()
            .ok_or_else(|| TumbleError::InvalidScene(format!("object {} has no polygons", id.0)))?;
        self.objects.push(StaticObject { kind, soup, bounds });
        Ok(id)
    }

    /// Adds a platform shuttling from `start` to `end`. Polygons are relative
    /// to the platform origin.
    pub fn add_platform(
        &mut self,
        material: Option<MaterialId>,
        polygons: &[Vec<DVec3>],
        start: DVec3,
        end: DVec3,
        speed: f64,
    ) -> TumbleResult<PlatformId> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(TumbleError::InvalidScene(format!(
                "platform speed must be finite and non-negative, got {speed}"
            )));
        }
        let object = self.allocate_object();
        let id = PlatformId(self.platforms.len() as u32);
        let soup = build_soup(object, ObjectKind::Platform(id), material, polygons)?;
        if soup.is_empty() {
            return Err(TumbleError::InvalidScene("platform has no polygons".into()));
        }
        self.platforms
            .push(LinearPlatform::new(id, object, soup, start, end, speed));
        Ok(id)
    }

    /// Adds or replaces another dynamic sphere.
    pub fn upsert_sphere(&mut self, sphere: SphereProxy) {
        match self.spheres.iter_mut().find(|s| s.id == sphere.id) {
            Some(existing) => *existing = sphere,
            None => self.spheres.push(sphere),
        }
    }

    pub fn sphere(&self, id: BodyId) -> Option<&SphereProxy> {
        self.spheres.iter().find(|s| s.id == id)
    }

    pub fn add_force(&mut self, force: RadialForce) {
        self.forces.push(force);
    }

    /// Runs every platform's own tick.
    pub fn advance_platforms(&mut self, dt: f64) {
        for platform in &mut self.platforms {
            platform.advance_path(dt);
        }
    }

    pub fn platforms(&self) -> &[LinearPlatform] {
        &self.platforms
    }

    pub fn object_count(&self) -> usize {
        self.objects.len() + self.platforms.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.objects.iter().map(|o| o.soup.len()).sum::<usize>()
    }
}

fn build_soup(
    object: ObjectId,
    kind: ObjectKind,
    material: Option<MaterialId>,
    polygons: &[Vec<DVec3>],
) -> TumbleResult<PolySoup> {
    let mut soup = PolySoup::new();
    for (i, polygon) in polygons.iter().enumerate() {
        soup.add_polygon(object, kind, material, polygon)
            .map_err(|e| TumbleError::InvalidGeometry(format!("object {}, polygon {i}: {e}", object.0)))?;
    }
    Ok(soup)
}

impl GeometrySource for StaticScene {
    fn query(
        &self,
        bounds: &Aabb,
        mask: ObjectMask,
        include_platforms: bool,
        exclude: Option<BodyId>,
        out: &mut QueryResult,
    ) {
        for object in &self.objects {
            let wanted = match object.kind {
                ObjectKind::Shape => mask.intersects(ObjectMask::SHAPE),
                _ => mask.intersects(ObjectMask::INTERIOR),
            };
            if wanted && object.bounds.overlaps(bounds) {
                out.soup.append_overlapping(&object.soup, bounds, DVec3::ZERO);
            }
        }

        if include_platforms && mask.intersects(ObjectMask::PLATFORM) {
            for platform in &self.platforms {
                if platform.extruded_box().overlaps(bounds) || platform.world_box().overlaps(bounds) {
                    platform.build_poly_list(bounds, &mut out.soup);
                }
            }
        }

        if mask.intersects(ObjectMask::BODY) {
            for sphere in &self.spheres {
                if Some(sphere.id) == exclude {
                    continue;
                }
                if Aabb::around_sphere(sphere.position, sphere.radius).overlaps(bounds) {
                    out.spheres.push(*sphere);
                }
            }
        }
    }

    fn material(&self, id: MaterialId) -> Option<Coefficients> {
        self.materials.get(id.index()).map(SurfaceMaterial::coefficients)
    }

    fn force_at(&self, position: DVec3, _radius: f64) -> DVec3 {
        self.forces
            .iter()
            .filter_map(|f| {
                let offset = position - f.center;
                let distance = offset.length();
                if distance > f.radius || distance == 0.0 {
                    return None;
                }
                Some(offset / distance * f.strength)
            })
            .sum()
    }

    fn set_sphere_velocity(&mut self, id: BodyId, velocity: DVec3) {
        if let Some(sphere) = self.spheres.iter_mut().find(|s| s.id == id) {
            sphere.velocity = velocity;
        }
    }

    fn platform_ids(&self) -> Vec<PlatformId> {
        self.platforms.iter().map(|p| p.id()).collect()
    }

    fn platform(&self, id: PlatformId) -> Option<&dyn MovingPlatform> {
        self.platforms
            .get(id.index())
            .map(|p| p as &dyn MovingPlatform)
    }

    fn platform_mut(&mut self, id: PlatformId) -> Option<&mut dyn MovingPlatform> {
        self.platforms
            .get_mut(id.index())
            .map(|p| p as &mut dyn MovingPlatform)
    }

    fn name(&self) -> &str {
        "static_scene"
    }
}
