//! # tumble-material
//!
//! Surface materials and material database.
//!
//! ## Design
//!
//! A [`SurfaceMaterial`] carries the three coefficients the contact core
//! reads from a struck surface: friction, restitution and a push-away
//! "force". Scenes index materials by [`tumble_types::MaterialId`]; a missing
//! id resolves to [`Coefficients::FALLBACK`].
//!
//! The [`MaterialDatabase`] stores named presets so scene files can refer to
//! materials by name.

pub mod database;
pub mod properties;

pub use database::MaterialDatabase;
pub use properties::{Coefficients, SurfaceMaterial};
