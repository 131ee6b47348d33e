//! JSON scene description.
//!
//! ```json
//! {
//!   "materials": [{ "name": "rubber", "friction": 1.5, "restitution": 0.6 }],
//!   "objects": [{ "material": "default", "polygons": [[[-5,-5,0],[5,-5,0],[5,5,0],[-5,5,0]]] }],
//!   "platforms": [],
//!   "spheres": [],
//!   "forces": []
//! }
//! ```
//!
//! Material names resolve against the scene's own `materials` first, then the
//! built-in presets of [`MaterialDatabase`].

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_material::{MaterialDatabase, SurfaceMaterial};
use tumble_types::{BodyId, MaterialId, TumbleError, TumbleResult};

use crate::source::SphereProxy;
use crate::static_scene::{RadialForce, StaticScene};

/// An immobile object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(default)]
    pub material: Option<String>,
    /// Shapes receive collision notifications; plain geometry does not.
    #[serde(default)]
    pub shape: bool,
    pub polygons: Vec<Vec<[f64; 3]>>,
}

/// A platform shuttling between `start` and `end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDesc {
    #[serde(default)]
    pub material: Option<String>,
    /// Polygons relative to the platform origin.
    pub polygons: Vec<Vec<[f64; 3]>>,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub speed: f64,
}

/// Another dynamic sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDesc {
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    pub radius: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_bounce")]
    pub bounce_restitution: f64,
}

fn default_mass() -> f64 {
    1.0
}

fn default_bounce() -> f64 {
    0.9
}

/// A full scene description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub materials: Vec<SurfaceMaterial>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    #[serde(default)]
    pub platforms: Vec<PlatformDesc>,
    #[serde(default)]
    pub spheres: Vec<SphereDesc>,
    #[serde(default)]
    pub forces: Vec<RadialForce>,
}

fn to_vec(p: [f64; 3]) -> DVec3 {
    DVec3::from_array(p)
}

fn to_polygons(polys: &[Vec<[f64; 3]>]) -> Vec<Vec<DVec3>> {
    polys
        .iter()
        .map(|poly| poly.iter().copied().map(to_vec).collect())
        .collect()
}

impl SceneFile {
    /// Parses a scene from a JSON string.
    pub fn from_json_str(json: &str) -> TumbleResult<Self> {
        serde_json::from_str(json).map_err(|e| TumbleError::Serialization(e.to_string()))
    }

    /// Reads and parses a scene file.
    pub fn load(path: impl AsRef<Path>) -> TumbleResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            objects = scene.objects.len(),
            platforms = scene.platforms.len(),
            "loaded scene file"
        );
        Ok(scene)
    }

    pub fn to_json_string(&self) -> TumbleResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TumbleError::Serialization(e.to_string()))
    }

    /// Builds the reference scene, validating every polygon and material name.
    pub fn build(&self) -> TumbleResult<StaticScene> {
        let presets = MaterialDatabase::with_defaults();
        let mut scene = StaticScene::new();

        for material in &self.materials {
            scene.add_material(material.clone())?;
        }

        let resolve = |scene: &mut StaticScene, name: &Option<String>| -> TumbleResult<Option<MaterialId>> {
            let Some(name) = name else {
                return Ok(None);
            };
            if let Some(id) = scene.material_id(name) {
                return Ok(Some(id));
            }
            let preset = presets.require(name)?.clone();
            scene.add_material(preset).map(Some)
        };

        for object in &self.objects {
            let material = resolve(&mut scene, &object.material)?;
            scene.add_object(object.shape, material, &to_polygons(&object.polygons))?;
        }

        for platform in &self.platforms {
            let material = resolve(&mut scene, &platform.material)?;
            scene.add_platform(
                material,
                &to_polygons(&platform.polygons),
                to_vec(platform.start),
                to_vec(platform.end),
                platform.speed,
            )?;
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            if sphere.radius <= 0.0 || sphere.mass <= 0.0 {
                return Err(TumbleError::InvalidScene(format!(
                    "sphere {i} needs positive radius and mass"
                )));
            }
            // Body id 0 is reserved for the simulated body.
            scene.upsert_sphere(SphereProxy {
                id: BodyId(i as u32 + 1),
                position: to_vec(sphere.position),
                velocity: to_vec(sphere.velocity),
                radius: sphere.radius,
                mass: sphere.mass,
                bounce_restitution: sphere.bounce_restitution,
            });
        }

        for force in &self.forces {
            scene.add_force(*force);
        }

        Ok(scene)
    }
}
