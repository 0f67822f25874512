//! Error types for body construction and preset loading.

use thiserror::Error;

/// Rejected physical configuration.
///
/// Returned at construction time so that a body with an invalid
/// configuration never becomes active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    #[error("moment of inertia must be positive and finite, got {0}")]
    InvalidInertia(f64),

    #[error("collision radius must be non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("displaced volume must be non-negative with a positive reference depth, got volume={volume} depth={reference_depth}")]
    InvalidVolume { volume: f64, reference_depth: f64 },

    #[error("drag coefficient must be non-negative, got {0}")]
    InvalidDrag(f64),

    #[error("control limit {name} must be finite, got {value}")]
    InvalidControlLimit { name: &'static str, value: f64 },

    #[error("thrust range is inverted: min={min} max={max}")]
    InvertedThrustRange { min: f64, max: f64 },
}

/// Errors that can occur while loading YAML presets.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("preset not found: {0}")]
    NotFound(String),

    #[error("preset {name} is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: PhysicsError,
    },
}
