//! Material database with the built-in surface presets.

use std::collections::HashMap;

use tumble_types::{TumbleError, TumbleResult};

use crate::properties::SurfaceMaterial;

/// A named collection of surface material presets.
///
/// Materials are looked up by name (e.g., "default", "bumper").
/// Custom materials can be registered at runtime.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    materials: HashMap<String, SurfaceMaterial>,
}

impl MaterialDatabase {
    /// Creates a new database with the 4 built-in presets.
    pub fn with_defaults() -> Self {
        let mut db = Self::empty();

        db.register(default_surface());
        db.register(low_friction());
        db.register(high_friction());
        db.register(bumper());

        db
    }

    /// Creates an empty database.
    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material. Overwrites if the name already exists.
    pub fn register(&mut self, material: SurfaceMaterial) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Looks up a material by name. Returns `None` if not found.
    pub fn get(&self, name: &str) -> Option<&SurfaceMaterial> {
        self.materials.get(name)
    }

    /// Looks up a material by name, failing with `UnknownMaterial`.
    pub fn require(&self, name: &str) -> TumbleResult<&SurfaceMaterial> {
        self.get(name)
            .ok_or_else(|| TumbleError::UnknownMaterial(name.to_string()))
    }

    /// Returns all registered material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialDatabase {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── Built-in Surface Presets ─────────────────────────────────────────

/// Plain floor: full friction, full restitution multiplier.
fn default_surface() -> SurfaceMaterial {
    SurfaceMaterial::new("default", 1.0, 1.0)
}

/// Ice-like surface. The body keeps sliding.
fn low_friction() -> SurfaceMaterial {
    SurfaceMaterial::new("low_friction", 0.2, 1.0)
}

/// Sticky, dead surface. Grips hard and soaks up bounces.
fn high_friction() -> SurfaceMaterial {
    SurfaceMaterial::new("high_friction", 4.5, 0.5)
}

/// Bumper: no bounce of its own, pushes the body away instead.
fn bumper() -> SurfaceMaterial {
    SurfaceMaterial::new("bumper", 0.5, 0.0).with_force(15.0)
}
