//! Simulated bodies and their lifecycle.
//!
//! Bodies are created `Unready` while their visual asset loads elsewhere.
//! The loader calls [`RigidBody::mark_ready`] once the asset exists; only
//! then does the body take part in integration and collision.
//!
//! ```text
//!   Unready ──mark_ready──▶ Active ──despawn──▶ Destroyed
//!      └──────────────────despawn──────────────────▲
//! ```

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::PhysicsError;
use crate::forces::water_drag_force;
use crate::integrator::{ForceModel, ForceSample, IntegratorConfig, SemiImplicitEuler};
use crate::types::{BodyState, SphereProperties, VesselProperties, Vec3};

/// Where a body is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Asset still loading; excluded from integration and collision
    #[default]
    Unready,
    Active,
    /// Terminal
    Destroyed,
}

impl Lifecycle {
    /// Apply the asset-ready signal. Returns true if this call activated.
    fn activate(&mut self) -> bool {
        match self {
            Lifecycle::Unready => {
                *self = Lifecycle::Active;
                true
            }
            Lifecycle::Active | Lifecycle::Destroyed => false,
        }
    }
}

/// Anything the collision resolver can push around.
pub trait Collidable {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn mass(&self) -> f64;
    fn collision_radius(&self) -> f64;

    /// Add `delta` to the velocity.
    fn apply_velocity_change(&mut self, delta: Vec3);

    /// Inactive bodies are skipped by detection and resolution.
    fn is_active(&self) -> bool {
        true
    }
}

// =============================================================================
// Rigid body
// =============================================================================

/// A buoyant vessel: kinematic state plus validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    props: VesselProperties,
    inertia: f64,
    state: BodyState,
    acceleration: Vec3,
    lifecycle: Lifecycle,
}

impl RigidBody {
    /// Create an `Unready` body, rejecting configurations with non-positive
    /// mass or inertia.
    pub fn new(props: VesselProperties, state: BodyState) -> Result<Self, PhysicsError> {
        if let Err(err) = props.validate() {
            log::debug!("rejected vessel {:?}: {}", props.name, err);
            return Err(err);
        }
        let inertia = props.inertia();
        Ok(Self {
            props,
            inertia,
            state,
            acceleration: Vec3::ZERO,
            lifecycle: Lifecycle::Unready,
        })
    }

    pub fn props(&self) -> &VesselProperties {
        &self.props
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Acceleration from the most recent integration step.
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Deliver the asset-ready signal. Duplicate signals are ignored.
    pub fn mark_ready(&mut self) -> bool {
        let activated = self.lifecycle.activate();
        if activated {
            log::debug!("vessel {:?} active", self.props.name);
        }
        activated
    }

    /// Remove the body from the simulation for good.
    pub fn despawn(&mut self) {
        if self.lifecycle != Lifecycle::Destroyed {
            log::debug!("vessel {:?} destroyed", self.props.name);
            self.lifecycle = Lifecycle::Destroyed;
        }
    }

    /// Advance the body by `dt`. A no-op unless the body is active.
    ///
    /// Returns whether the body was integrated.
    pub fn integrate<F: ForceModel + ?Sized>(
        &mut self,
        forces: &F,
        env: &Environment,
        config: &IntegratorConfig,
        dt: f64,
    ) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        let result = SemiImplicitEuler::step(&self.state, &self.props, forces, env, config, dt);
        self.state = result.state;
        self.acceleration = result.acceleration;
        true
    }

    /// Advance the body by `dt` under a precomputed force and torque.
    ///
    /// Steering is dynamic and the position advances along the velocity.
    /// Idle damping applies while the environment's thrust is zero.
    pub fn integrate_sample(
        &mut self,
        sample: ForceSample,
        env: &Environment,
        config: &IntegratorConfig,
        dt: f64,
    ) -> bool {
        self.integrate(&Precomputed(sample), env, config, dt)
    }
}

/// Replays one fixed sample regardless of state.
struct Precomputed(ForceSample);

impl ForceModel for Precomputed {
    fn sample(
        &self,
        _state: &BodyState,
        _props: &VesselProperties,
        _env: &Environment,
    ) -> ForceSample {
        self.0
    }
}

impl Collidable for RigidBody {
    fn position(&self) -> Vec3 {
        self.state.pos
    }

    fn velocity(&self) -> Vec3 {
        self.state.vel
    }

    fn mass(&self) -> f64 {
        self.props.mass
    }

    fn collision_radius(&self) -> f64 {
        self.props.collision_radius
    }

    fn apply_velocity_change(&mut self, delta: Vec3) {
        self.state.vel += delta;
    }

    fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}

// =============================================================================
// Sphere
// =============================================================================

/// A floating spherical obstacle, treated as a point mass.
///
/// Spheres have no buoyancy channel: they stay at their spawn height and
/// drift horizontally, slowed by water drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    props: SphereProperties,
    pos: Vec3,
    vel: Vec3,
    acceleration: Vec3,
    lifecycle: Lifecycle,
}

impl Sphere {
    pub fn new(props: SphereProperties, pos: Vec3) -> Result<Self, PhysicsError> {
        if !(props.mass > 0.0) || !props.mass.is_finite() {
            return Err(PhysicsError::InvalidMass(props.mass));
        }
        if !(props.radius >= 0.0) {
            return Err(PhysicsError::InvalidRadius(props.radius));
        }
        if !(props.drag_coefficient_air >= 0.0) {
            return Err(PhysicsError::InvalidDrag(props.drag_coefficient_air));
        }
        Ok(Self {
            props,
            pos,
            vel: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            lifecycle: Lifecycle::Unready,
        })
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }

    pub fn props(&self) -> &SphereProperties {
        &self.props
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn mark_ready(&mut self) -> bool {
        self.lifecycle.activate()
    }

    pub fn despawn(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Drift for `dt` under water drag. A no-op unless active.
    pub fn integrate(&mut self, dt: f64) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        let drag = water_drag_force(self.vel.horizontal(), self.props.drag_coefficient_air);
        self.acceleration = drag / self.props.mass;
        self.vel += self.acceleration * dt;
        self.vel.y = 0.0;
        self.pos += self.vel * dt;
        true
    }
}

impl Collidable for Sphere {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn velocity(&self) -> Vec3 {
        self.vel
    }

    fn mass(&self) -> f64 {
        self.props.mass
    }

    fn collision_radius(&self) -> f64 {
        self.props.radius
    }

    /// Spheres hold their spawn height, so the vertical part of an
    /// impulse is dropped.
    fn apply_velocity_change(&mut self, delta: Vec3) {
        self.vel += delta.horizontal();
    }

    fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}

// =============================================================================
// Tests
// =============================================================================
