//! # Keel Core
//!
//! Physics for a buoyant vessel on a fluid surface.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (Vec3, body state, vessel properties)
//! - `environment`: Ambient parameters and the clamped control surface
//! - `forces`: Gravity, buoyancy, drag and the sail/engine propulsion strategies
//! - `integrator`: Numerical integration (semi-implicit Euler)
//! - `body`: Vessels and spheres with their Unready/Active/Destroyed lifecycle
//! - `collision`: Overlap detection and impulse resolution
//! - `simulation`: Main orchestrator
//! - `presets`: YAML-based preset loader
//! - `error`: Construction and loading errors

pub mod body;
pub mod collision;
pub mod environment;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod presets;
pub mod simulation;
pub mod types;

pub use error::{PhysicsError, PresetError};
