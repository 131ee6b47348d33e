//! Contact data types.
//!
//! A [`Contact`] is rebuilt every sub-step by the manifold builder. What was
//! struck is resolved once, into a [`ContactSource`], when the contact is
//! built.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_material::Coefficients;
use tumble_scene::ObjectKind;
use tumble_types::{BodyId, MaterialId, ObjectId, PlatformId};

/// What a contact touches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactSource {
    /// Immobile geometry. Shapes receive collision notifications.
    Static { object: ObjectId, shape: bool },
    /// A moving platform's geometry.
    Platform { object: ObjectId, platform: PlatformId },
    /// Another dynamic sphere.
    Body {
        id: BodyId,
        mass: f64,
        bounce_restitution: f64,
    },
}

impl ContactSource {
    /// Source of a polygon owned by `object`.
    pub fn from_poly(object: ObjectId, kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Interior => ContactSource::Static { object, shape: false },
            ObjectKind::Shape => ContactSource::Static { object, shape: true },
            ObjectKind::Platform(platform) => ContactSource::Platform { object, platform },
        }
    }

    #[inline]
    pub fn is_body(&self) -> bool {
        matches!(self, ContactSource::Body { .. })
    }

    /// Platform id if this is platform geometry.
    pub fn platform(&self) -> Option<PlatformId> {
        match self {
            ContactSource::Platform { platform, .. } => Some(*platform),
            _ => None,
        }
    }
}

/// A surface within tolerance of the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub source: ContactSource,
    /// Nearest surface point to the body center.
    pub position: DVec3,
    /// Unit normal from the surface toward the body center.
    pub normal: DVec3,
    /// Velocity of the surface at the contact.
    pub surface_velocity: DVec3,
    pub friction: f64,
    pub restitution: f64,
    pub force: f64,
    pub material: Option<MaterialId>,
    /// Distance from the body center to `position`.
    pub distance: f64,
    /// Load along the normal, filled in by force resolution.
    pub normal_force: f64,
}

impl Contact {
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            friction: self.friction,
            restitution: self.restitution,
            force: self.force,
        }
    }

    /// Body velocity relative to the surface, along the normal.
    /// Negative means the body is moving into the surface.
    #[inline]
    pub fn normal_velocity(&self, body_velocity: DVec3) -> f64 {
        self.normal.dot(body_velocity - self.surface_velocity)
    }
}

/// The contact recorded by the most recent swept impact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactContact {
    /// Point touched on the surface.
    pub position: DVec3,
    /// Normal at impact, pointing toward the body center.
    pub normal: DVec3,
    pub coefficients: Coefficients,
    pub material: Option<MaterialId>,
    pub source: ContactSource,
}
