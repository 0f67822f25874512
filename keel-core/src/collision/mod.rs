//! Collision detection and resolution between vessels and floating spheres.
//!
//! This module handles:
//! - **Detection**: a center-distance overlap test against the summed radii
//! - **Resolution**: an instantaneous impulse along the contact normal
//!
//! ## Impulse Model
//!
//! ```text
//!        A ●──────▶ n ──────● B      n = normalize(x_A − x_B)
//!
//!   v_n = (v_A − v_B) · n
//!   j   = −(1 + e) · v_n / (1/m_A + 1/m_B)
//!   v_A += j·n / m_A,   v_B −= j·n / m_B
//! ```
//!
//! Pairs already separating (`v_n > 0`) are left alone. Collision state is
//! not sticky: it is recomputed from the distance test every step.

pub mod detection;
pub mod resolution;

pub use detection::*;
pub use resolution::*;

use crate::body::Collidable;

/// What happened to one pair during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairOutcome {
    /// The distance test reported overlap
    pub collided: bool,
    /// The impulse applied, if the pair was approaching
    pub impulse: Option<ImpulseReport>,
}

/// Detect overlap and, if found, resolve it with the configured restitution.
pub fn collide<A, B>(detector: &CollisionDetector, a: &mut A, b: &mut B) -> PairOutcome
where
    A: Collidable + ?Sized,
    B: Collidable + ?Sized,
{
    if !detector.overlaps(&*a, &*b) {
        return PairOutcome {
            collided: false,
            impulse: None,
        };
    }
    PairOutcome {
        collided: true,
        impulse: CollisionResolver::resolve(a, b, detector.config.restitution),
    }
}
