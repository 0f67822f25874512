//! Sphere-sphere overlap detection.
//!
//! Every collidable is bounded by a sphere of its collision radius. Two
//! bodies overlap when their centers are closer than the sum of their
//! radii plus the configured margin.

use serde::{Deserialize, Serialize};

use crate::body::Collidable;
use crate::types::Vec3;

/// Configuration for collision handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Extra distance added to the summed radii (m)
    pub margin: f64,
    /// Coefficient of restitution, 0 (inelastic) to 1 (elastic)
    pub restitution: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            margin: 0.0,
            restitution: 0.7,
        }
    }
}

/// Geometry of an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the second body toward the first
    pub normal: Vec3,
    pub distance: f64,
    /// How far the padded spheres overlap (m)
    pub penetration: f64,
}

/// Overlap detector for vessels and spheres.
#[derive(Debug, Clone, Default)]
pub struct CollisionDetector {
    pub config: CollisionConfig,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// True when both bodies are active and their padded spheres overlap.
    pub fn overlaps<A, B>(&self, a: &A, b: &B) -> bool
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
    {
        self.contact(a, b).is_some()
    }

    /// Contact geometry if the pair overlaps.
    ///
    /// Inactive bodies never collide.
    pub fn contact<A, B>(&self, a: &A, b: &B) -> Option<Contact>
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
    {
        if !a.is_active() || !b.is_active() {
            return None;
        }

        let offset = a.position() - b.position();
        let distance = offset.magnitude();
        let reach = a.collision_radius() + b.collision_radius() + self.config.margin;

        if distance < reach {
            Some(Contact {
                normal: offset.normalized(),
                distance,
                penetration: reach - distance,
            })
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
