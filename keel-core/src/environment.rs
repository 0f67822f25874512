//! Ambient simulation parameters and the control surface that mutates them.
//!
//! The [`Environment`] is owned by the simulation loop. Force computation
//! only reads it; the input layer changes it through [`Environment::apply`]
//! or the clamping setters. Every input is clamped into its documented
//! range rather than rejected, so the control surface is always valid.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::types::{constants, Vec3};

/// Direction of a stepped control adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjust {
    Increase,
    Decrease,
}

impl Adjust {
    fn sign(self) -> f64 {
        match self {
            Adjust::Increase => 1.0,
            Adjust::Decrease => -1.0,
        }
    }
}

/// A discrete control command, already translated from keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Forward (positive) or backward (negative) drive speed, m/s.
    SetForwardDrive(f64),
    /// Kinematic turn rate, rad/s.
    SetRotationRate(f64),
    /// Release both drive and rotation.
    ClearDrive,
    RotateWind(Adjust),
    TrimSail(Adjust),
    AdjustThrust(Adjust),
    AdjustSteering(Adjust),
}

/// Step sizes and ranges for the stepped controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLimits {
    pub wind_step: f64,
    pub sail_step: f64,
    pub thrust_step: f64,
    pub thrust_min: f64,
    pub thrust_max: f64,
    pub steering_step: f64,
    /// Steering is clamped to `[-steering_max, steering_max]`.
    pub steering_max: f64,
}

impl Default for ControlLimits {
    fn default() -> Self {
        let five_degrees = std::f64::consts::PI / 36.0;
        Self {
            wind_step: five_degrees,
            sail_step: five_degrees,
            thrust_step: 500.0,
            thrust_min: -2000.0,
            thrust_max: 5000.0,
            steering_step: five_degrees,
            steering_max: FRAC_PI_4,
        }
    }
}

impl ControlLimits {
    /// Reject limits the clamping setters cannot honor.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fields = [
            ("wind_step", self.wind_step),
            ("sail_step", self.sail_step),
            ("thrust_step", self.thrust_step),
            ("thrust_min", self.thrust_min),
            ("thrust_max", self.thrust_max),
            ("steering_step", self.steering_step),
            ("steering_max", self.steering_max),
        ];
        if let Some(&(name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(PhysicsError::InvalidControlLimit { name, value });
        }
        if self.thrust_min > self.thrust_max {
            return Err(PhysicsError::InvertedThrustRange {
                min: self.thrust_min,
                max: self.thrust_max,
            });
        }
        Ok(())
    }
}

/// Process-wide ambient parameters read by the force model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub gravity: f64,
    pub fluid_density: f64,

    /// Never normalized by the core; its magnitude scales sail force.
    pub wind_direction: Vec3,

    /// Sail trim angle in `[0, π/2]`.
    pub sail_angle: f64,
    /// Engine thrust (N); zero means idle.
    pub thrust_level: f64,
    /// Rudder angle in `[-steering_max, steering_max]`.
    pub steering_angle: f64,

    /// Commanded drive speed for heading-advance propulsion (m/s).
    pub forward_drive: f64,
    /// Commanded turn rate for kinematic steering (rad/s).
    pub rotation_rate: f64,

    pub limits: ControlLimits,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: constants::GRAVITY,
            fluid_density: constants::WATER_DENSITY,
            wind_direction: Vec3::new(0.0, 0.0, 1.0),
            sail_angle: 0.0,
            thrust_level: 0.0,
            steering_angle: 0.0,
            forward_drive: 0.0,
            rotation_rate: 0.0,
            limits: ControlLimits::default(),
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Still air, no propulsion input.
    pub fn calm() -> Self {
        Self {
            wind_direction: Vec3::ZERO,
            ..Self::default()
        }
    }

    /// Apply one control command, clamping the result.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetForwardDrive(speed) => self.forward_drive = finite_or_zero(speed),
            Command::SetRotationRate(rate) => self.rotation_rate = finite_or_zero(rate),
            Command::ClearDrive => {
                self.forward_drive = 0.0;
                self.rotation_rate = 0.0;
            }
            Command::RotateWind(adjust) => {
                self.wind_direction = self
                    .wind_direction
                    .rotated_about_y(adjust.sign() * self.limits.wind_step);
            }
            Command::TrimSail(adjust) => {
                self.set_sail_angle(self.sail_angle + adjust.sign() * self.limits.sail_step);
            }
            Command::AdjustThrust(adjust) => {
                self.set_thrust_level(self.thrust_level + adjust.sign() * self.limits.thrust_step);
            }
            Command::AdjustSteering(adjust) => {
                self.set_steering_angle(
                    self.steering_angle + adjust.sign() * self.limits.steering_step,
                );
            }
        }
        log::trace!("applied {:?}", command);
    }

    pub fn set_sail_angle(&mut self, angle: f64) {
        self.sail_angle = clamp_sail_angle(angle);
    }

    pub fn set_thrust_level(&mut self, thrust: f64) {
        let (min, max) = (self.limits.thrust_min, self.limits.thrust_max);
        self.thrust_level = clamp_between(finite_or_zero(thrust), min, max);
    }

    pub fn set_steering_angle(&mut self, angle: f64) {
        let max = self.limits.steering_max.abs();
        self.steering_angle = clamp_between(finite_or_zero(angle), -max, max);
    }

    pub fn set_wind_direction(&mut self, wind: Vec3) {
        if wind.is_finite() {
            self.wind_direction = wind;
        }
    }
}

/// Clamp a sail trim angle into `[0, π/2]`; NaN maps to zero.
pub fn clamp_sail_angle(angle: f64) -> f64 {
    finite_or_zero(angle).clamp(0.0, FRAC_PI_2)
}

// `f64::clamp` asserts `min <= max`; limits may come from hand-edited YAML.
fn clamp_between(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sail_trim_is_clamped() {
        let mut env = Environment::new();
        for _ in 0..100 {
            env.apply(Command::TrimSail(Adjust::Increase));
        }
        assert!((env.sail_angle - FRAC_PI_2).abs() < 1e-12);

        for _ in 0..100 {
            env.apply(Command::TrimSail(Adjust::Decrease));
        }
        assert_eq!(env.sail_angle, 0.0);
    }

    #[test]
    fn test_thrust_stays_in_range() {
        let mut env = Environment::new();
        for _ in 0..50 {
            env.apply(Command::AdjustThrust(Adjust::Increase));
        }
        assert_eq!(env.thrust_level, env.limits.thrust_max);

        for _ in 0..50 {
            env.apply(Command::AdjustThrust(Adjust::Decrease));
        }
        assert_eq!(env.thrust_level, env.limits.thrust_min);
    }

    #[test]
    fn test_steering_is_symmetric() {
        let mut env = Environment::new();
        env.set_steering_angle(10.0);
        assert_eq!(env.steering_angle, FRAC_PI_4);
        env.set_steering_angle(-10.0);
        assert_eq!(env.steering_angle, -FRAC_PI_4);
    }

    #[test]
    fn test_wind_rotation_keeps_magnitude() {
        let mut env = Environment::new();
        env.set_wind_direction(Vec3::new(0.0, 0.0, 3.0));
        for _ in 0..18 {
            env.apply(Command::RotateWind(Adjust::Increase));
        }
        // 18 steps of 5° is a quarter turn toward +X.
        assert!((env.wind_direction.x - 3.0).abs() < 1e-9);
        assert!(env.wind_direction.z.abs() < 1e-9);
        assert!((env.wind_direction.magnitude() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_inputs_are_neutralized() {
        let mut env = Environment::new();
        env.set_sail_angle(f64::NAN);
        assert_eq!(env.sail_angle, 0.0);
        env.apply(Command::SetForwardDrive(f64::INFINITY));
        assert_eq!(env.forward_drive, 0.0);
        env.set_wind_direction(Vec3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(env.wind_direction, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_default_limits_are_valid() {
        assert!(ControlLimits::default().validate().is_ok());
    }

    #[test]
    fn test_bad_limits_are_rejected() {
        let inverted = ControlLimits {
            thrust_min: 100.0,
            thrust_max: 0.0,
            ..ControlLimits::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(PhysicsError::InvertedThrustRange { min: 100.0, max: 0.0 })
        );

        let nan_steering = ControlLimits {
            steering_max: f64::NAN,
            ..ControlLimits::default()
        };
        assert!(matches!(
            nan_steering.validate(),
            Err(PhysicsError::InvalidControlLimit { name: "steering_max", .. })
        ));
    }

    #[test]
    fn test_setters_survive_bad_limits() {
        let mut env = Environment::new();
        env.limits.thrust_min = 100.0;
        env.limits.thrust_max = 0.0;
        env.set_thrust_level(50.0);
        assert!(env.thrust_level.is_finite());

        env.limits.steering_max = f64::NAN;
        env.set_steering_angle(0.1);
        assert!(env.steering_angle.is_finite());
    }

    #[test]
    fn test_clear_drive() {
        let mut env = Environment::new();
        env.apply(Command::SetForwardDrive(3.0));
        env.apply(Command::SetRotationRate(-0.5));
        env.apply(Command::ClearDrive);
        assert_eq!(env.forward_drive, 0.0);
        assert_eq!(env.rotation_rate, 0.0);
    }
}
