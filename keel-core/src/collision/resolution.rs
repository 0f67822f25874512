//! Impulse-based collision response.
//!
//! Both bodies are treated as free point masses at their centers. The
//! response only changes velocities; positions are left to the integrator.

use crate::body::Collidable;
use crate::types::{constants, Vec3};

/// The impulse applied by one resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseReport {
    /// Unit contact normal, pointing from the second body to the first
    pub normal: Vec3,
    /// Relative velocity along the normal before the impulse
    pub velocity_along_normal: f64,
    /// Signed impulse magnitude along the normal (N·s)
    pub impulse: f64,
}

/// Collision resolver for pairs of collidables.
pub struct CollisionResolver;

impl CollisionResolver {
    /// Apply a restitution impulse to an approaching pair.
    ///
    /// # Arguments
    /// * `a`, `b` - The two bodies; `a` receives `+j·n`, `b` receives `−j·n`
    /// * `restitution` - Clamped into `[0, 1]`
    ///
    /// # Returns
    /// The applied impulse, or `None` when nothing was changed: the pair is
    /// separating, a body is inactive, the centers coincide, or the
    /// inverse-mass sum is degenerate.
    pub fn resolve<A, B>(a: &mut A, b: &mut B, restitution: f64) -> Option<ImpulseReport>
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
    {
        if !a.is_active() || !b.is_active() {
            return None;
        }

        let normal = (a.position() - b.position()).normalized();
        if normal == Vec3::ZERO {
            return None;
        }

        let relative_velocity = a.velocity() - b.velocity();
        let velocity_along_normal = relative_velocity.dot(&normal);

        // Already separating
        if velocity_along_normal > 0.0 {
            return None;
        }

        let inverse_mass_a = 1.0 / a.mass();
        let inverse_mass_b = 1.0 / b.mass();
        let inverse_mass_sum = inverse_mass_a + inverse_mass_b;
        if !(inverse_mass_sum > constants::EPSILON) || !inverse_mass_sum.is_finite() {
            return None;
        }

        let restitution = if restitution.is_finite() {
            restitution.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let impulse = -(1.0 + restitution) * velocity_along_normal / inverse_mass_sum;
        let impulse_vec = normal * impulse;

        a.apply_velocity_change(impulse_vec * inverse_mass_a);
        b.apply_velocity_change(-(impulse_vec * inverse_mass_b));

        log::debug!(
            "resolved collision: v_n={:.4} j={:.4} e={}",
            velocity_along_normal,
            impulse,
            restitution
        );

        Some(ImpulseReport {
            normal,
            velocity_along_normal,
            impulse,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
