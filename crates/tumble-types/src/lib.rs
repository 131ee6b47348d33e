//! # tumble-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the tumble rolling-sphere physics core.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other tumble crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{TumbleError, TumbleResult};
pub use ids::{BodyId, MaterialId, ObjectId, PlatformId};
pub use scalar::Scalar;
