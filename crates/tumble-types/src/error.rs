//! Error types for the tumble physics core.
//!
//! Physics degeneracies (parallel planes, negative discriminants, iteration
//! caps) are never errors; they are handled as control flow inside the
//! solver. Errors only come out of construction and validation boundaries.

use thiserror::Error;

/// Unified error type for the tumble workspace.
#[derive(Debug, Error)]
pub enum TumbleError {
    /// Configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polygon data is malformed (too few vertices, zero area, bad index).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Scene description is inconsistent.
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// A physics profile name did not match any known profile.
    #[error("Unknown physics profile: {0}")]
    UnknownProfile(String),

    /// A material name is not registered.
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, TumbleError>`.
pub type TumbleResult<T> = Result<T, TumbleError>;
