//! Surface material coefficients.

use serde::{Deserialize, Serialize};
use tumble_types::{TumbleError, TumbleResult};

/// Contact coefficients of a surface.
///
/// | Field | Used by |
/// |---|---|
/// | `friction` | rolling/sliding friction and bounce spin transfer |
/// | `restitution` | bounce: fraction of closing speed returned |
/// | `force` | external forces: push-away acceleration along the contact normal |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    /// Human-readable name (e.g., "bumper").
    pub name: String,

    /// Multiplier on the body's static, kinetic and bounce friction.
    pub friction: f64,

    /// Multiplier on the body's bounce restitution.
    pub restitution: f64,

    /// Push-away force applied while in contact. Zero for ordinary surfaces.
    #[serde(default)]
    pub force: f64,
}

impl SurfaceMaterial {
    /// Creates a material with zero force.
    pub fn new(name: impl Into<String>, friction: f64, restitution: f64) -> Self {
        Self {
            name: name.into(),
            friction,
            restitution,
            force: 0.0,
        }
    }

    /// Builder-style force setter.
    pub fn with_force(mut self, force: f64) -> Self {
        self.force = force;
        self
    }

    /// The bare coefficients, without the name.
    #[inline]
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            friction: self.friction,
            restitution: self.restitution,
            force: self.force,
        }
    }

    /// Rejects negative or non-finite coefficients.
    pub fn validate(&self) -> TumbleResult<()> {
        let fields = [
            ("friction", self.friction),
            ("restitution", self.restitution),
            ("force", self.force),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(TumbleError::InvalidConfig(format!(
                    "material '{}': {field} must be a finite non-negative number, got {value}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Friction, restitution and force copied into each contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub friction: f64,
    pub restitution: f64,
    pub force: f64,
}

impl Coefficients {
    /// Coefficients used when a polygon carries no material.
    pub const FALLBACK: Self = Self {
        friction: 1.0,
        restitution: 1.0,
        force: 0.0,
    };
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::FALLBACK
    }
}
