//! Named physics tuning profiles.
//!
//! Profiles differ in a handful of discrete behaviours rather than in
//! numbers. Each profile resolves to a [`ProfileTuning`] so the integrator
//! branches on explicit flags instead of on profile names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tumble_types::{constants, TumbleError};

/// A named tuning profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsProfile {
    #[default]
    Mbu,
    Mbg,
    Xna,
    MbuSlopes,
    MbgSlopes,
}

/// How the sub-step loop of a tick ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Loop until the tick's time is used up.
    TimeExhausted,
    /// Also stop after this many sub-steps, even with time left.
    IterationCap(u32),
}

/// Behaviour flags a profile resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTuning {
    pub termination: Termination,
    /// Axis-restricted mode keeps the vertical velocity component.
    pub restrict_keeps_vertical: bool,
    /// Scale the move vector so diagonals reach full speed, then clamp to 1.
    pub diagonal_boost: bool,
    /// Add the supporting normal force of every resting contact.
    pub surface_support: bool,
    /// Surface slide only applies on moving surfaces (otherwise only on still ones).
    pub slide_requires_moving_surface: bool,
    /// Nearest-point clipping snaps without feeding the snapped point into
    /// later edge tests.
    pub clip_independent: bool,
}

impl PhysicsProfile {
    /// All profiles, in declaration order.
    pub const ALL: [PhysicsProfile; 5] = [
        PhysicsProfile::Mbu,
        PhysicsProfile::Mbg,
        PhysicsProfile::Xna,
        PhysicsProfile::MbuSlopes,
        PhysicsProfile::MbgSlopes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhysicsProfile::Mbu => "mbu",
            PhysicsProfile::Mbg => "mbg",
            PhysicsProfile::Xna => "xna",
            PhysicsProfile::MbuSlopes => "mbu_slopes",
            PhysicsProfile::MbgSlopes => "mbg_slopes",
        }
    }

    fn is_mbg_family(self) -> bool {
        matches!(self, PhysicsProfile::Mbg | PhysicsProfile::MbgSlopes)
    }

    /// Resolves the profile into explicit behaviour flags.
    pub fn tuning(self) -> ProfileTuning {
        let mbg = self.is_mbg_family();
        ProfileTuning {
            termination: if mbg {
                Termination::TimeExhausted
            } else {
                Termination::IterationCap(constants::PROFILE_ITERATION_CAP)
            },
            restrict_keeps_vertical: mbg,
            diagonal_boost: !mbg,
            surface_support: !matches!(self, PhysicsProfile::MbuSlopes | PhysicsProfile::MbgSlopes),
            slide_requires_moving_surface: self == PhysicsProfile::Xna,
            clip_independent: mbg,
        }
    }
}

impl fmt::Display for PhysicsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhysicsProfile {
    type Err = TumbleError;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        PhysicsProfile::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| TumbleError::UnknownProfile(s.to_string()))
    }
}
