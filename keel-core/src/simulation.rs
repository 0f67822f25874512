//! Main orchestrator: one synchronous physics step per frame.
//!
//! Each step runs, strictly in order:
//! 1. force computation and integration for every active vessel
//! 2. drift for every active sphere
//! 3. overlap detection and impulse resolution for every active pair
//!
//! The returned [`StepReport`] is what the presentation layer consumes.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::body::{Collidable, Lifecycle, RigidBody, Sphere};
use crate::collision::{collide, CollisionConfig, CollisionDetector, PairOutcome};
use crate::environment::{Command, Environment};
use crate::error::PhysicsError;
use crate::forces::{PropulsionModel, RestThreshold, VesselForces};
use crate::integrator::IntegratorConfig;
use crate::types::{BodyState, SphereProperties, VesselProperties, Vec3};

/// Handle to a vessel owned by a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VesselId(usize);

/// Handle to a sphere owned by a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SphereId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Vessel(VesselId),
    Sphere(SphereId),
}

/// Per-body output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub body: BodyRef,
    pub position: Vec3,
    /// Yaw in radians; always zero for spheres
    pub heading: f64,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// Per-pair output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactReport {
    pub a: BodyRef,
    pub b: BodyRef,
    pub collided: bool,
    /// Impulse magnitude applied, if any
    pub impulse: Option<f64>,
}

/// Everything the presentation layer needs after a step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepReport {
    /// Simulated time after the step (s)
    pub time: f64,
    pub bodies: Vec<BodySnapshot>,
    pub contacts: Vec<ContactReport>,
}

impl StepReport {
    pub fn body(&self, body: BodyRef) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|snapshot| snapshot.body == body)
    }

    pub fn any_collision(&self) -> bool {
        self.contacts.iter().any(|contact| contact.collided)
    }
}

/// Tunable parameters of the step, loadable from a YAML preset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub propulsion: PropulsionModel,
    pub rest: RestThreshold,
    pub integrator: IntegratorConfig,
    pub collision: CollisionConfig,
}

// =============================================================================
// Frame clock
// =============================================================================

/// Source of the per-frame timestep.
#[derive(Debug, Clone)]
pub enum FrameClock {
    /// A constant assumed frame interval
    Fixed { dt: f64 },
    /// Wall-clock delta since the previous tick, capped at `max_dt`
    Measured { last: Option<Instant>, max_dt: f64 },
}

impl FrameClock {
    pub const DEFAULT_MAX_DT: f64 = 0.1;

    pub fn fixed(dt: f64) -> Self {
        FrameClock::Fixed { dt }
    }

    /// Fixed 60 Hz frames
    pub fn sixty_hz() -> Self {
        Self::fixed(1.0 / 60.0)
    }

    pub fn measured() -> Self {
        FrameClock::Measured {
            last: None,
            max_dt: Self::DEFAULT_MAX_DT,
        }
    }

    /// Next timestep in seconds. The first measured tick returns zero.
    pub fn tick(&mut self) -> f64 {
        match self {
            FrameClock::Fixed { dt } => *dt,
            FrameClock::Measured { last, max_dt } => {
                let now = Instant::now();
                let elapsed = last
                    .map(|previous| now.saturating_duration_since(previous))
                    .unwrap_or(Duration::ZERO);
                *last = Some(now);
                elapsed.as_secs_f64().min(*max_dt)
            }
        }
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Owns the environment and every body; advances them one frame at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    env: Environment,
    forces: VesselForces,
    integrator: IntegratorConfig,
    detector: CollisionDetector,
    vessels: Vec<RigidBody>,
    spheres: Vec<Sphere>,
    time: f64,
}

impl Simulation {
    pub fn new(env: Environment, config: SimulationConfig) -> Self {
        Self {
            env,
            forces: VesselForces::new(config.propulsion).with_rest_threshold(config.rest),
            integrator: config.integrator,
            detector: CollisionDetector::with_config(config.collision),
            vessels: Vec::new(),
            spheres: Vec::new(),
            time: 0.0,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Forward an input command to the environment.
    pub fn apply(&mut self, command: Command) {
        self.env.apply(command);
    }

    pub fn forces(&self) -> &VesselForces {
        &self.forces
    }

    // -------------------------------------------------------------------------
    // Body management
    // -------------------------------------------------------------------------

    /// Add an `Unready` vessel. Invalid configurations are rejected here so
    /// they can never become active.
    pub fn add_vessel(
        &mut self,
        props: VesselProperties,
        state: BodyState,
    ) -> Result<VesselId, PhysicsError> {
        let body = RigidBody::new(props, state)?;
        self.vessels.push(body);
        Ok(VesselId(self.vessels.len() - 1))
    }

    /// Add an `Unready` sphere with an initial velocity.
    pub fn add_sphere(
        &mut self,
        props: SphereProperties,
        pos: Vec3,
        vel: Vec3,
    ) -> Result<SphereId, PhysicsError> {
        let sphere = Sphere::new(props, pos)?.with_velocity(vel);
        self.spheres.push(sphere);
        Ok(SphereId(self.spheres.len() - 1))
    }

    pub fn vessel(&self, id: VesselId) -> Option<&RigidBody> {
        self.vessels.get(id.0)
    }

    pub fn sphere(&self, id: SphereId) -> Option<&Sphere> {
        self.spheres.get(id.0)
    }

    /// Asset-ready signal for a vessel. Returns true on the first signal only.
    pub fn mark_vessel_ready(&mut self, id: VesselId) -> bool {
        self.vessels
            .get_mut(id.0)
            .map(RigidBody::mark_ready)
            .unwrap_or(false)
    }

    pub fn mark_sphere_ready(&mut self, id: SphereId) -> bool {
        self.spheres
            .get_mut(id.0)
            .map(Sphere::mark_ready)
            .unwrap_or(false)
    }

    /// Destroy a vessel. Its id stays valid but the body is inert forever.
    pub fn despawn_vessel(&mut self, id: VesselId) {
        if let Some(body) = self.vessels.get_mut(id.0) {
            body.despawn();
        }
    }

    pub fn despawn_sphere(&mut self, id: SphereId) {
        if let Some(sphere) = self.spheres.get_mut(id.0) {
            sphere.despawn();
        }
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Run one frame with the next timestep from `clock`.
    pub fn advance(&mut self, clock: &mut FrameClock) -> StepReport {
        let dt = clock.tick();
        self.step(dt)
    }

    /// Run one frame: integrate, then resolve collisions.
    ///
    /// A non-positive or non-finite `dt` leaves every body untouched. The
    /// report still carries their snapshots but no contacts.
    pub fn step(&mut self, dt: f64) -> StepReport {
        if !(dt > 0.0) || !dt.is_finite() {
            if dt != 0.0 {
                log::warn!("skipping step with invalid dt={}", dt);
            }
            return StepReport {
                time: self.time,
                bodies: self.snapshots(),
                contacts: Vec::new(),
            };
        }

        for vessel in &mut self.vessels {
            vessel.integrate(&self.forces, &self.env, &self.integrator, dt);
        }
        for sphere in &mut self.spheres {
            sphere.integrate(dt);
        }

        let contacts = self.resolve_contacts();
        self.time += dt;

        StepReport {
            time: self.time,
            bodies: self.snapshots(),
            contacts,
        }
    }

    fn resolve_contacts(&mut self) -> Vec<ContactReport> {
        let mut contacts = Vec::new();

        for i in 0..self.vessels.len() {
            if self.vessels[i].lifecycle() != Lifecycle::Active {
                continue;
            }

            for j in (i + 1)..self.vessels.len() {
                if self.vessels[j].lifecycle() != Lifecycle::Active {
                    continue;
                }
                let (head, tail) = self.vessels.split_at_mut(j);
                let outcome = collide(&self.detector, &mut head[i], &mut tail[0]);
                contacts.push(report(
                    BodyRef::Vessel(VesselId(i)),
                    BodyRef::Vessel(VesselId(j)),
                    outcome,
                ));
            }

            for k in 0..self.spheres.len() {
                if self.spheres[k].lifecycle() != Lifecycle::Active {
                    continue;
                }
                let outcome = collide(&self.detector, &mut self.vessels[i], &mut self.spheres[k]);
                contacts.push(report(
                    BodyRef::Vessel(VesselId(i)),
                    BodyRef::Sphere(SphereId(k)),
                    outcome,
                ));
            }
        }

        contacts
    }

    fn snapshots(&self) -> Vec<BodySnapshot> {
        let vessels = self
            .vessels
            .iter()
            .enumerate()
            .filter(|(_, vessel)| vessel.lifecycle() == Lifecycle::Active)
            .map(|(i, vessel)| BodySnapshot {
                body: BodyRef::Vessel(VesselId(i)),
                position: vessel.state().pos,
                heading: vessel.heading(),
                velocity: vessel.state().vel,
                acceleration: vessel.acceleration(),
            });

        let spheres = self
            .spheres
            .iter()
            .enumerate()
            .filter(|(_, sphere)| sphere.lifecycle() == Lifecycle::Active)
            .map(|(k, sphere)| BodySnapshot {
                body: BodyRef::Sphere(SphereId(k)),
                position: sphere.position(),
                heading: 0.0,
                velocity: sphere.velocity(),
                acceleration: sphere.acceleration(),
            });

        vessels.chain(spheres).collect()
    }
}

fn report(a: BodyRef, b: BodyRef, outcome: PairOutcome) -> ContactReport {
    ContactReport {
        a,
        b,
        collided: outcome.collided,
        impulse: outcome.impulse.map(|impulse| impulse.impulse),
    }
}

// =============================================================================
// Tests
// =============================================================================
