//! Core types for the vessel simulation.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Heading and angular velocity: radians, radians per second
//! - Mass: kilograms (kg)
//! - Force: Newtons (N), torque: Newton-meters (N·m)

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::PhysicsError;

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities, forces and wind.
///
/// Coordinate system:
/// - X: horizontal, starboard when heading is zero
/// - Y: vertical (positive upward, fluid plane at y = 0)
/// - Z: horizontal, forward when heading is zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector pointing along a yaw heading: `(sin θ, 0, cos θ)`.
    pub fn from_heading(heading: f64) -> Self {
        let (sin, cos) = heading.sin_cos();
        Self::new(sin, 0.0, cos)
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < constants::EPSILON {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// The same vector with its vertical component dropped.
    pub fn horizontal(&self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Rotate about the +Y axis by `angle` radians.
    ///
    /// Consistent with [`Vec3::from_heading`]: rotating `(0, 0, 1)` by θ
    /// yields `from_heading(θ)`.
    pub fn rotated_about_y(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, scalar: f64) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Body State
// =============================================================================

/// Kinematic state of a vessel at a given instant.
///
/// Orientation is yaw only; pitch and roll are not simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub heading: f64,
    pub angular_velocity: f64,
}

impl BodyState {
    pub fn new(pos: Vec3, vel: Vec3, heading: f64, angular_velocity: f64) -> Self {
        Self {
            pos,
            vel,
            heading,
            angular_velocity,
        }
    }

    /// Body at rest at a given position, facing +Z
    pub fn at_rest(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            heading: 0.0,
            angular_velocity: 0.0,
        }
    }

    /// Unit vector the body is pointing along.
    pub fn forward(&self) -> Vec3 {
        Vec3::from_heading(self.heading)
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at_rest(Vec3::ZERO)
    }
}

// =============================================================================
// Vessel Properties
// =============================================================================

/// Physical configuration of a buoyant vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselProperties {
    pub name: String,
    pub mass: f64,

    /// Displaced volume when fully settled at the fluid plane (m³)
    pub base_volume: f64,
    /// Height above the fluid plane at which buoyancy vanishes (m)
    pub reference_depth: f64,

    /// Linear air drag coefficient; water drag is always twice this.
    pub drag_coefficient_air: f64,

    /// Hull extent used for the plate moment of inertia (m)
    pub hull_length: f64,
    pub hull_beam: f64,

    /// Distance from the center of mass to the rudder/propeller (m)
    pub arm_length: f64,

    pub collision_radius: f64,

    /// Lowest allowed y for the body center (draft floor)
    pub floor: f64,
}

impl VesselProperties {
    /// A small day-sailer, matching `presets/vessels/dinghy.yaml`
    pub fn dinghy() -> Self {
        Self {
            name: "Dinghy".to_string(),
            mass: 500.0,
            base_volume: 2.0,
            reference_depth: 1.0,
            drag_coefficient_air: 20.0,
            hull_length: 4.0,
            hull_beam: 1.6,
            arm_length: 2.0,
            collision_radius: 2.0,
            floor: -0.5,
        }
    }

    /// Moment of inertia about the vertical axis, treating the hull as a
    /// flat rectangular plate: `I = m (l² + b²) / 12`.
    pub fn inertia(&self) -> f64 {
        self.mass * (self.hull_length * self.hull_length + self.hull_beam * self.hull_beam) / 12.0
    }

    /// Reject configurations that would produce NaN or division by zero
    /// during integration.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.mass > 0.0) || !self.mass.is_finite() {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        let inertia = self.inertia();
        if !(inertia > 0.0) || !inertia.is_finite() {
            return Err(PhysicsError::InvalidInertia(inertia));
        }
        if !(self.collision_radius >= 0.0) {
            return Err(PhysicsError::InvalidRadius(self.collision_radius));
        }
        if !(self.base_volume >= 0.0) || !(self.reference_depth > 0.0) {
            return Err(PhysicsError::InvalidVolume {
                volume: self.base_volume,
                reference_depth: self.reference_depth,
            });
        }
        if !(self.drag_coefficient_air >= 0.0) {
            return Err(PhysicsError::InvalidDrag(self.drag_coefficient_air));
        }
        Ok(())
    }

    /// Height at which buoyancy exactly balances gravity, if one exists.
    ///
    /// Solves `ρ · V · (1 − y/d) = m` for `y`. Returns `None` when the hull
    /// cannot displace its own mass of fluid.
    pub fn equilibrium_height(&self, fluid_density: f64) -> Option<f64> {
        let full_displacement = fluid_density * self.base_volume;
        if full_displacement < self.mass || full_displacement <= 0.0 {
            return None;
        }
        Some(self.reference_depth * (1.0 - self.mass / full_displacement))
    }
}

impl Default for VesselProperties {
    fn default() -> Self {
        Self::dinghy()
    }
}

/// Physical configuration of a floating spherical obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereProperties {
    pub mass: f64,
    pub radius: f64,
    pub drag_coefficient_air: f64,
}

impl SphereProperties {
    /// A buoy-sized ball
    pub fn buoy() -> Self {
        Self {
            mass: 50.0,
            radius: 1.0,
            drag_coefficient_air: 2.0,
        }
    }
}

impl Default for SphereProperties {
    fn default() -> Self {
        Self::buoy()
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants used in the simulation.
pub mod constants {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f64 = 9.81;

    /// Fresh water density (kg/m³)
    pub const WATER_DENSITY: f64 = 1000.0;

    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-10;
}

// =============================================================================
// Tests
// =============================================================================
