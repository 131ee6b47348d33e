//! Body and simulation configuration.
//!
//! Defaults reproduce the stock rolling-ball tuning. Gameplay feel depends on
//! these exact values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tumble_types::constants;
use tumble_types::{TumbleError, TumbleResult};

use crate::profile::PhysicsProfile;

/// Density giving a 0.2-radius body unit mass.
pub const DEFAULT_DENSITY: f64 = 29.841551829730376;

/// Tuning of the rolling body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub radius: f64,
    /// Mass per unit volume; mass = density · 4/3 · π · r³.
    pub density: f64,

    /// Top roll speed reachable by input alone.
    pub max_roll_velocity: f64,
    /// Cap on the angular acceleration input can request.
    pub angular_acceleration: f64,
    /// Cap on the angular deceleration with no input.
    pub braking_acceleration: f64,

    pub static_friction: f64,
    pub kinetic_friction: f64,
    /// Friction used to transfer slip into spin during a bounce.
    pub bounce_kinetic_friction: f64,

    pub gravity: f64,
    /// Hits shallower than this fraction of speed slide instead of bouncing.
    pub max_dot_slide: f64,
    pub bounce_restitution: f64,
    pub air_acceleration: f64,
    pub jump_impulse: f64,
    /// Closing speeds below this land softly with no bounce.
    pub min_bounce_vel: f64,
    /// Radius of the box searched for force fields.
    pub max_force_radius: f64,

    /// Rebound speeds classifying bounce effects as soft, medium or hard.
    pub min_bounce_speed: f64,
    pub min_medium_bounce_speed: f64,
    pub min_hard_bounce_speed: f64,

    /// Longest sub-step (seconds).
    pub max_substep: f64,
    /// Hard cap on sub-steps per tick, applied to every profile.
    pub substep_cap: u32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            radius: 0.2,
            density: DEFAULT_DENSITY,
            max_roll_velocity: 25.0,
            angular_acceleration: 18.0,
            braking_acceleration: 8.0,
            static_friction: 1.0,
            kinetic_friction: 0.9,
            bounce_kinetic_friction: 0.2,
            gravity: constants::GRAVITY,
            max_dot_slide: 0.1,
            bounce_restitution: 0.9,
            air_acceleration: 5.0,
            jump_impulse: 1.0,
            min_bounce_vel: 0.1,
            max_force_radius: 1.0,
            min_bounce_speed: 1.0,
            min_medium_bounce_speed: 20.0,
            min_hard_bounce_speed: 30.0,
            max_substep: constants::MAX_SUBSTEP,
            substep_cap: constants::SUBSTEP_SAFETY_CAP,
        }
    }
}

impl BodyConfig {
    /// Mass derived from radius and density.
    pub fn mass(&self) -> f64 {
        self.density * 4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }

    /// Rejects values the solver cannot run with.
    pub fn validate(&self) -> TumbleResult<()> {
        let positive = [
            ("radius", self.radius),
            ("density", self.density),
            ("max_substep", self.max_substep),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TumbleError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("max_roll_velocity", self.max_roll_velocity),
            ("angular_acceleration", self.angular_acceleration),
            ("braking_acceleration", self.braking_acceleration),
            ("static_friction", self.static_friction),
            ("kinetic_friction", self.kinetic_friction),
            ("bounce_kinetic_friction", self.bounce_kinetic_friction),
            ("gravity", self.gravity),
            ("max_dot_slide", self.max_dot_slide),
            ("bounce_restitution", self.bounce_restitution),
            ("air_acceleration", self.air_acceleration),
            ("jump_impulse", self.jump_impulse),
            ("min_bounce_vel", self.min_bounce_vel),
            ("max_force_radius", self.max_force_radius),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TumbleError::InvalidConfig(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }
        if self.substep_cap == 0 {
            return Err(TumbleError::InvalidConfig("substep_cap must be at least 1".into()));
        }
        Ok(())
    }
}

/// Active power-up style multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Replaces the body's bounce restitution while set.
    pub bounce: Option<f64>,
    pub gravity_scale: f64,
    /// Replaces the body's air acceleration while set.
    pub air_acceleration: Option<f64>,
    pub mass_scale: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            bounce: None,
            gravity_scale: 1.0,
            air_acceleration: None,
            mass_scale: 1.0,
        }
    }
}

impl Modifiers {
    /// Bounce multiplier applied to every surface restitution.
    pub fn bounce(&self, body: &BodyConfig) -> f64 {
        self.bounce.unwrap_or(body.bounce_restitution)
    }

    pub fn air_acceleration(&self, body: &BodyConfig) -> f64 {
        self.air_acceleration.unwrap_or(body.air_acceleration)
    }
}

/// Configuration of a whole simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Tick length (seconds).
    pub tick: f64,
    pub profile: PhysicsProfile,
    pub body: BodyConfig,
    pub modifiers: Modifiers,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick: constants::DEFAULT_TICK,
            profile: PhysicsProfile::default(),
            body: BodyConfig::default(),
            modifiers: Modifiers::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a TOML config.
    pub fn from_toml_str(text: &str) -> TumbleResult<Self> {
        let config: SimConfig =
            toml::from_str(text).map_err(|e| TumbleError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> TumbleResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), profile = %config.profile, "loaded config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> TumbleResult<String> {
        toml::to_string(self).map_err(|e| TumbleError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> TumbleResult<()> {
        if !(self.tick.is_finite() && self.tick > 0.0) {
            return Err(TumbleError::InvalidConfig(format!(
                "tick must be positive, got {}",
                self.tick
            )));
        }
        if !(self.modifiers.mass_scale.is_finite() && self.modifiers.mass_scale > 0.0) {
            return Err(TumbleError::InvalidConfig("mass_scale must be positive".into()));
        }
        self.body.validate()
    }
}
