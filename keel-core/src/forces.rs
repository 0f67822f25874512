//! Forces acting on a floating vessel.
//!
//! This module implements the [`ForceModel`] trait for a buoyant hull:
//!
//! - **Gravity**: constant downward pull, `-m · g`
//! - **Buoyancy**: weight of the displaced fluid, `ρ · V · g`, where the
//!   submerged volume shrinks linearly as the hull rises out of the fluid
//! - **Drag**: linear air drag `-c · v` plus water drag fixed at twice that
//! - **Propulsion**: either a wind-driven sail or an engine with a rudder
//!
//! ## Vertical self-stabilization
//!
//! ```text
//!   y >= d   ───────────  no buoyancy, the hull falls
//!                ▲
//!   y = y*   ─ ─ ┼ ─ ─ ─  ρ·V·(1 − y*/d)·g = m·g
//!                ▼
//!   y = 0    ═══════════  fluid plane, full base volume
//! ```
//!
//! A hull above its equilibrium height `y*` is pulled down by gravity, a
//! hull below it is pushed up by the excess buoyancy.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::environment::{clamp_sail_angle, Environment};
use crate::integrator::{Advance, ForceModel, ForceSample, Steering};
use crate::types::{BodyState, VesselProperties, Vec3};

// =============================================================================
// Force components
// =============================================================================

/// Constant downward gravity on the vertical axis.
pub fn gravity_force(mass: f64, gravity: f64) -> Vec3 {
    Vec3::new(0.0, -mass * gravity, 0.0)
}

/// Upward buoyancy of magnitude `ρ · V · g`.
pub fn buoyancy_force(volume_displaced: f64, fluid_density: f64, gravity: f64) -> Vec3 {
    Vec3::new(0.0, fluid_density * volume_displaced * gravity, 0.0)
}

/// Submerged volume at a given height: `V · clamp(1 − y/d, 0, 1)`.
pub fn submerged_volume(base_volume: f64, height: f64, reference_depth: f64) -> f64 {
    if reference_depth <= 0.0 {
        return 0.0;
    }
    base_volume * (1.0 - height / reference_depth).clamp(0.0, 1.0)
}

/// Linear air drag, `-c · v`.
pub fn air_drag_force(velocity: Vec3, drag_coefficient_air: f64) -> Vec3 {
    velocity * -drag_coefficient_air
}

/// Linear water drag, always twice the air coefficient: `-2c · v`.
pub fn water_drag_force(velocity: Vec3, drag_coefficient_air: f64) -> Vec3 {
    velocity * (-2.0 * drag_coefficient_air)
}

/// Sail trim that yields maximum force.
pub const FULL_TRIM: f64 = FRAC_PI_2;

/// Fraction of the wind a sail converts into force.
///
/// The angle is clamped into `[0, π/2]`: flat to the wind (0) gives
/// nothing, perpendicular (π/2) gives everything.
pub fn sail_effectiveness(sail_angle: f64) -> f64 {
    clamp_sail_angle(sail_angle).sin().abs()
}

/// Wind force on a trimmed sail: `wind · |sin(angle)|`.
pub fn wind_propulsion(wind_direction: Vec3, sail_angle: f64) -> Vec3 {
    wind_direction * sail_effectiveness(sail_angle)
}

/// Engine thrust of magnitude `thrust_level` along the heading.
pub fn thrust_propulsion(thrust_level: f64, heading: f64) -> Vec3 {
    Vec3::from_heading(heading) * thrust_level
}

/// Rudder torque, `thrust · arm · sin(steering)`.
///
/// With zero thrust there is no turning moment, so a drifting hull cannot
/// be steered through this channel.
pub fn steering_torque(thrust_level: f64, arm_length: f64, steering_angle: f64) -> f64 {
    thrust_level * arm_length * steering_angle.sin()
}

// =============================================================================
// Rest detection
// =============================================================================

/// Threshold under which a body counts as at rest.
///
/// The default epsilon of zero keeps the strict semantics: only an exactly
/// zero net force and an exactly zero velocity are at rest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestThreshold {
    pub epsilon: f64,
}

impl RestThreshold {
    pub const STRICT: RestThreshold = RestThreshold { epsilon: 0.0 };

    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.max(0.0),
        }
    }
}

/// Whether both the net force and the velocity are within the threshold.
pub fn is_at_rest(net_force: Vec3, velocity: Vec3, threshold: RestThreshold) -> bool {
    net_force.magnitude() <= threshold.epsilon && velocity.magnitude() <= threshold.epsilon
}

// =============================================================================
// Propulsion strategies
// =============================================================================

/// A propulsion source and the motion conventions that come with it.
pub trait Propulsion {
    /// Propulsive force for the current instant.
    fn force(&self, state: &BodyState, env: &Environment) -> Vec3;

    /// Turning moment about the vertical axis.
    fn torque(&self, props: &VesselProperties, env: &Environment) -> f64;

    /// How the heading changes.
    fn steering(&self) -> Steering;

    /// How the position follows the velocity.
    fn advance(&self) -> Advance;

    /// True when nothing is pushing the hull, which enables idle damping.
    fn is_idle(&self, state: &BodyState, env: &Environment) -> bool;
}

/// Wind on a trimmable sail.
///
/// Turns kinematically at the commanded rotation rate and always moves
/// where it points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SailPropulsion {
    /// Multiplier on the wind vector, 1.0 for the bare formula
    pub force_scale: f64,
}

impl Default for SailPropulsion {
    fn default() -> Self {
        Self { force_scale: 1.0 }
    }
}

impl Propulsion for SailPropulsion {
    fn force(&self, _state: &BodyState, env: &Environment) -> Vec3 {
        wind_propulsion(env.wind_direction, env.sail_angle) * self.force_scale
    }

    fn torque(&self, _props: &VesselProperties, _env: &Environment) -> f64 {
        0.0
    }

    fn steering(&self) -> Steering {
        Steering::Kinematic
    }

    fn advance(&self) -> Advance {
        Advance::AlongHeading
    }

    fn is_idle(&self, state: &BodyState, env: &Environment) -> bool {
        self.force(state, env) == Vec3::ZERO
    }
}

/// Engine thrust along the heading with a rudder.
///
/// Turns dynamically through torque and inertia and moves along its true
/// velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePropulsion {
    /// Multiplier on the thrust level, 1.0 for the bare formula
    pub thrust_scale: f64,
}

impl Default for EnginePropulsion {
    fn default() -> Self {
        Self { thrust_scale: 1.0 }
    }
}

impl Propulsion for EnginePropulsion {
    fn force(&self, state: &BodyState, env: &Environment) -> Vec3 {
        thrust_propulsion(env.thrust_level * self.thrust_scale, state.heading)
    }

    fn torque(&self, props: &VesselProperties, env: &Environment) -> f64 {
        steering_torque(
            env.thrust_level * self.thrust_scale,
            props.arm_length,
            env.steering_angle,
        )
    }

    fn steering(&self) -> Steering {
        Steering::Dynamic
    }

    fn advance(&self) -> Advance {
        Advance::AlongVelocity
    }

    fn is_idle(&self, _state: &BodyState, env: &Environment) -> bool {
        env.thrust_level == 0.0
    }
}

/// The configured propulsion source. Exactly one is active per simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropulsionModel {
    Sail(SailPropulsion),
    Engine(EnginePropulsion),
}

impl PropulsionModel {
    pub fn sail() -> Self {
        PropulsionModel::Sail(SailPropulsion::default())
    }

    pub fn engine() -> Self {
        PropulsionModel::Engine(EnginePropulsion::default())
    }

    fn inner(&self) -> &dyn Propulsion {
        match self {
            PropulsionModel::Sail(sail) => sail,
            PropulsionModel::Engine(engine) => engine,
        }
    }
}

impl Default for PropulsionModel {
    fn default() -> Self {
        Self::sail()
    }
}

impl Propulsion for PropulsionModel {
    fn force(&self, state: &BodyState, env: &Environment) -> Vec3 {
        self.inner().force(state, env)
    }

    fn torque(&self, props: &VesselProperties, env: &Environment) -> f64 {
        self.inner().torque(props, env)
    }

    fn steering(&self) -> Steering {
        self.inner().steering()
    }

    fn advance(&self) -> Advance {
        self.inner().advance()
    }

    fn is_idle(&self, state: &BodyState, env: &Environment) -> bool {
        self.inner().is_idle(state, env)
    }
}

// =============================================================================
// Vessel force model
// =============================================================================

/// Forces split by source, recomputed every step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    pub gravity: Vec3,
    pub buoyancy: Vec3,
    pub air_drag: Vec3,
    pub water_drag: Vec3,
    pub propulsion: Vec3,
}

impl ForceBreakdown {
    pub fn total(&self) -> Vec3 {
        self.gravity + self.buoyancy + self.air_drag + self.water_drag + self.propulsion
    }
}

/// Complete force model for a floating vessel.
///
/// Combines gravity, buoyancy, air and water drag, and one propulsion
/// strategy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VesselForces {
    pub propulsion: PropulsionModel,
    #[serde(default)]
    pub rest: RestThreshold,
}

impl VesselForces {
    pub fn new(propulsion: PropulsionModel) -> Self {
        Self {
            propulsion,
            rest: RestThreshold::STRICT,
        }
    }

    pub fn with_rest_threshold(mut self, rest: RestThreshold) -> Self {
        self.rest = rest;
        self
    }

    /// Every force component acting on the body right now.
    pub fn breakdown(
        &self,
        state: &BodyState,
        props: &VesselProperties,
        env: &Environment,
    ) -> ForceBreakdown {
        let volume = submerged_volume(props.base_volume, state.pos.y, props.reference_depth);
        ForceBreakdown {
            gravity: gravity_force(props.mass, env.gravity),
            buoyancy: buoyancy_force(volume, env.fluid_density, env.gravity),
            air_drag: air_drag_force(state.vel, props.drag_coefficient_air),
            water_drag: water_drag_force(state.vel, props.drag_coefficient_air),
            propulsion: self.propulsion.force(state, env),
        }
    }

    /// Sum of gravity, buoyancy, both drags and propulsion.
    pub fn net_force(&self, state: &BodyState, props: &VesselProperties, env: &Environment) -> Vec3 {
        self.breakdown(state, props, env).total()
    }
}

impl ForceModel for VesselForces {
    fn sample(&self, state: &BodyState, props: &VesselProperties, env: &Environment) -> ForceSample {
        ForceSample {
            force: self.net_force(state, props, env),
            torque: self.propulsion.torque(props, env),
        }
    }

    fn steering(&self) -> Steering {
        self.propulsion.steering()
    }

    fn advance(&self) -> Advance {
        self.propulsion.advance()
    }

    fn is_idle(&self, state: &BodyState, env: &Environment) -> bool {
        self.propulsion.is_idle(state, env)
    }

    fn rest_threshold(&self) -> RestThreshold {
        self.rest
    }
}

// =============================================================================
// Tests
// =============================================================================
