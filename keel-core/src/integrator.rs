//! Numerical integration for advancing a vessel in time.
//!
//! The integrator is semi-implicit (symplectic) Euler: velocity is updated
//! from the acceleration first, and the position then follows the *new*
//! velocity. It is stable for the damped, stiff-ish buoyancy channel at
//! frame-sized timesteps where explicit Euler would pump energy in.
//!
//! ## Algorithm
//!
//! ```text
//! 1. a = F / m
//! 2. unless at rest:        v += a·dt
//! 3. if propulsion is idle: v *= linear_damping
//! 4. x += v·dt              (or along the heading, see Advance)
//! 5. if x.y < floor:        x.y = floor, v.y = 0
//! 6. ω: dynamic  -> ω = (ω + τ/I·dt) · angular_damping
//!       kinematic -> ω = commanded rotation rate
//!    θ += ω·dt
//! ```

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::forces::{is_at_rest, RestThreshold};
use crate::types::{BodyState, VesselProperties, Vec3};

/// Net force and torque on a body for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceSample {
    pub force: Vec3,
    pub torque: f64,
}

/// How the heading of a body changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steering {
    /// Angular velocity is set directly from the commanded rotation rate.
    Kinematic,
    /// Angular velocity integrates torque over the moment of inertia.
    Dynamic,
}

/// How the position follows the velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advance {
    /// Horizontal motion goes along the heading at the horizontal speed
    /// plus the commanded drive; vertical motion follows the velocity.
    AlongHeading,
    /// Position follows the true velocity vector.
    AlongVelocity,
}

/// Trait for computing forces on a vessel.
///
/// Implementations provide the physics model (buoyancy, drag, propulsion)
/// and the motion conventions of their propulsion source.
pub trait ForceModel {
    /// Compute net force and torque given the current state.
    fn sample(&self, state: &BodyState, props: &VesselProperties, env: &Environment) -> ForceSample;

    fn steering(&self) -> Steering {
        Steering::Dynamic
    }

    fn advance(&self) -> Advance {
        Advance::AlongVelocity
    }

    /// Whether idle damping applies this step.
    /// Default implementation: idle whenever the engine is off.
    fn is_idle(&self, _state: &BodyState, env: &Environment) -> bool {
        env.thrust_level == 0.0
    }

    fn rest_threshold(&self) -> RestThreshold {
        RestThreshold::STRICT
    }
}

/// Damping factors applied by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Velocity multiplier per step while propulsion is idle
    pub linear_damping: f64,
    /// Angular velocity multiplier per step under dynamic steering
    pub angular_damping: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            linear_damping: 0.98,
            angular_damping: 0.95,
        }
    }
}

/// Result of an integration step, containing the new state and metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationResult {
    pub state: BodyState,
    pub acceleration: Vec3,
    pub angular_acceleration: f64,
    /// True when velocity integration was skipped this step
    pub at_rest: bool,
}

/// Semi-implicit Euler integrator for vessel physics.
pub struct SemiImplicitEuler;

impl SemiImplicitEuler {
    /// Advance the vessel state by one time step.
    ///
    /// # Arguments
    /// * `state` - Current body state (position, velocity, heading, turn rate)
    /// * `props` - Vessel physical properties (mass, hull extent, floor)
    /// * `forces` - Force model providing net force and torque
    /// * `env` - Ambient parameters and control inputs
    /// * `config` - Damping factors
    /// * `dt` - Time step in seconds
    pub fn step<F: ForceModel + ?Sized>(
        state: &BodyState,
        props: &VesselProperties,
        forces: &F,
        env: &Environment,
        config: &IntegratorConfig,
        dt: f64,
    ) -> IntegrationResult {
        let sample = forces.sample(state, props, env);

        // Linear channel
        let acceleration = sample.force / props.mass;
        let at_rest = is_at_rest(sample.force, state.vel, forces.rest_threshold());

        let mut vel = state.vel;
        if !at_rest {
            vel += acceleration * dt;
        }
        if forces.is_idle(state, env) {
            vel *= config.linear_damping;
        }

        let mut pos = state.pos;
        match forces.advance() {
            Advance::AlongVelocity => pos += vel * dt,
            Advance::AlongHeading => {
                let speed = vel.horizontal().magnitude() + env.forward_drive;
                pos += state.forward() * (speed * dt);
                pos.y += vel.y * dt;
            }
        }

        if pos.y < props.floor {
            pos.y = props.floor;
            vel.y = 0.0;
        }

        // Angular channel, applied regardless of rest state
        let (angular_acceleration, angular_velocity) = match forces.steering() {
            Steering::Dynamic => {
                let alpha = sample.torque / props.inertia();
                let omega = (state.angular_velocity + alpha * dt) * config.angular_damping;
                (alpha, omega)
            }
            Steering::Kinematic => (0.0, env.rotation_rate),
        };
        let heading = state.heading + angular_velocity * dt;

        log::trace!(
            "integrated: pos={:?} vel={:?} heading={:.4} at_rest={}",
            pos,
            vel,
            heading,
            at_rest
        );

        IntegrationResult {
            state: BodyState {
                pos,
                vel,
                heading,
                angular_velocity,
            },
            acceleration,
            angular_acceleration,
            at_rest,
        }
    }

    /// Advance the state by multiple substeps.
    ///
    /// Total time advanced is `substeps * dt`.
    pub fn step_n<F: ForceModel + ?Sized>(
        state: &BodyState,
        props: &VesselProperties,
        forces: &F,
        env: &Environment,
        config: &IntegratorConfig,
        dt: f64,
        substeps: usize,
    ) -> IntegrationResult {
        let mut current = IntegrationResult {
            state: *state,
            acceleration: Vec3::ZERO,
            angular_acceleration: 0.0,
            at_rest: false,
        };

        for _ in 0..substeps {
            current = Self::step(&current.state, props, forces, env, config, dt);
        }

        current
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::{PropulsionModel, VesselForces};

    /// Constant force model for testing
    struct ConstantForce(Vec3);

    impl ForceModel for ConstantForce {
        fn sample(&self, _: &BodyState, _: &VesselProperties, _: &Environment) -> ForceSample {
            ForceSample {
                force: self.0,
                torque: 0.0,
            }
        }
    }

    /// Pure torque model with the engine running (no idle damping)
    struct ConstantTorque(f64);

    impl ForceModel for ConstantTorque {
        fn sample(&self, _: &BodyState, _: &VesselProperties, _: &Environment) -> ForceSample {
            ForceSample {
                force: Vec3::ZERO,
                torque: self.0,
            }
        }

        fn is_idle(&self, _: &BodyState, _: &Environment) -> bool {
            false
        }
    }

    fn undamped() -> IntegratorConfig {
        IntegratorConfig {
            linear_damping: 1.0,
            angular_damping: 1.0,
        }
    }

    fn deep_floor() -> VesselProperties {
        VesselProperties {
            floor: -1.0e9,
            ..VesselProperties::dinghy()
        }
    }

    #[test]
    fn test_velocity_updates_before_position() {
        let props = deep_floor();
        let env = Environment::calm();
        let forces = ConstantForce(Vec3::new(500.0, 0.0, 0.0)); // 1 m/s² on 500 kg

        let result =
            SemiImplicitEuler::step(&BodyState::default(), &props, &forces, &env, &undamped(), 0.5);

        // v = 0.5, x = v_new * dt = 0.25 (explicit Euler would leave x at 0)
        assert!((result.state.vel.x - 0.5).abs() < 1e-12);
        assert!((result.state.pos.x - 0.25).abs() < 1e-12);
        assert!((result.acceleration.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_idle_damping() {
        let props = deep_floor();
        let env = Environment::calm();
        let forces = ConstantForce(Vec3::ZERO);
        let state = BodyState::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.0, 0.0);

        let result = SemiImplicitEuler::step(
            &state,
            &props,
            &forces,
            &env,
            &IntegratorConfig::default(),
            0.1,
        );

        assert!((result.state.vel.x - 9.8).abs() < 1e-12);
        assert!((result.state.pos.x - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_no_damping_while_thrusting() {
        let props = deep_floor();
        let mut env = Environment::calm();
        env.set_thrust_level(1000.0);
        let forces = ConstantForce(Vec3::ZERO);
        let state = BodyState::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.0, 0.0);

        let result = SemiImplicitEuler::step(
            &state,
            &props,
            &forces,
            &env,
            &IntegratorConfig::default(),
            0.1,
        );
        assert_eq!(result.state.vel.x, 10.0);
    }

    #[test]
    fn test_at_rest_skips_velocity_integration() {
        let props = deep_floor();
        let env = Environment::calm();
        let forces = ConstantForce(Vec3::ZERO);

        let result = SemiImplicitEuler::step(
            &BodyState::default(),
            &props,
            &forces,
            &env,
            &undamped(),
            0.1,
        );
        assert!(result.at_rest);
        assert_eq!(result.state, BodyState::default());
    }

    #[test]
    fn test_floor_clamp() {
        let props = VesselProperties::dinghy();
        let env = Environment::calm();
        let forces = ConstantForce(Vec3::new(0.0, -1.0e6, 0.0));
        let state = BodyState::new(Vec3::new(0.0, props.floor, 0.0), Vec3::ZERO, 0.0, 0.0);

        let result = SemiImplicitEuler::step(&state, &props, &forces, &env, &undamped(), 0.1);

        assert_eq!(result.state.pos.y, props.floor);
        assert_eq!(result.state.vel.y, 0.0);
    }

    #[test]
    fn test_dynamic_turn_with_damping() {
        let props = deep_floor();
        let env = Environment::calm();
        let torque = props.inertia() * 2.0; // 2 rad/s²
        let forces = ConstantTorque(torque);

        let result = SemiImplicitEuler::step(
            &BodyState::default(),
            &props,
            &forces,
            &env,
            &IntegratorConfig::default(),
            0.1,
        );

        assert!((result.angular_acceleration - 2.0).abs() < 1e-12);
        assert!((result.state.angular_velocity - 0.2 * 0.95).abs() < 1e-12);
        assert!((result.state.heading - 0.019).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_applies_even_at_rest() {
        let props = deep_floor();
        let env = Environment::calm();
        let forces = ConstantTorque(100.0);

        let result = SemiImplicitEuler::step(
            &BodyState::default(),
            &props,
            &forces,
            &env,
            &undamped(),
            0.1,
        );
        assert!(result.at_rest);
        assert!(result.state.heading > 0.0);
    }

    #[test]
    fn test_sail_moves_where_it_points() {
        let props = deep_floor();
        let mut env = Environment::calm();
        env.apply(crate::environment::Command::SetForwardDrive(2.0));
        let forces = VesselForces::new(PropulsionModel::sail());

        // Drifting sideways while pointing along +Z
        let height = props.equilibrium_height(env.fluid_density).unwrap();
        let state = BodyState::new(
            Vec3::new(0.0, height, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            0.0,
            0.0,
        );

        let result = SemiImplicitEuler::step(
            &state,
            &props,
            &forces,
            &env,
            &IntegratorConfig::default(),
            0.1,
        );

        assert_eq!(result.state.pos.x, 0.0, "No motion off the heading");
        assert!(result.state.pos.z > 0.2, "got z={}", result.state.pos.z);
    }

    #[test]
    fn test_kinematic_turn() {
        let props = deep_floor();
        let mut env = Environment::calm();
        env.apply(crate::environment::Command::SetRotationRate(0.5));
        let forces = VesselForces::new(PropulsionModel::sail());

        let result = SemiImplicitEuler::step_n(
            &BodyState::default(),
            &props,
            &forces,
            &env,
            &IntegratorConfig::default(),
            0.1,
            10,
        );

        assert_eq!(result.state.angular_velocity, 0.5);
        assert!((result.state.heading - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_engine_turns_only_under_thrust() {
        let props = deep_floor();
        let mut env = Environment::calm();
        env.set_steering_angle(0.5);
        let forces = VesselForces::new(PropulsionModel::engine());
        let config = IntegratorConfig::default();

        let drifting =
            SemiImplicitEuler::step(&BodyState::default(), &props, &forces, &env, &config, 0.1);
        assert_eq!(drifting.state.heading, 0.0);

        env.set_thrust_level(2000.0);
        let powered =
            SemiImplicitEuler::step(&BodyState::default(), &props, &forces, &env, &config, 0.1);
        assert!(powered.state.heading > 0.0);
    }

    #[test]
    fn test_substeps() {
        let props = deep_floor();
        let env = Environment::calm();
        let forces = ConstantForce(Vec3::new(0.0, 0.0, 250.0));
        let config = undamped();

        let stepped = SemiImplicitEuler::step_n(
            &BodyState::default(),
            &props,
            &forces,
            &env,
            &config,
            0.01,
            100,
        );

        // v = a·t exactly; x carries the semi-implicit O(dt) offset.
        assert!((stepped.state.vel.z - 0.5).abs() < 1e-9);
        let analytic = 0.5 * 0.5 * 1.0;
        assert!(
            (stepped.state.pos.z - analytic).abs() < 0.01,
            "Position {} too far from {}",
            stepped.state.pos.z,
            analytic
        );
    }
}
