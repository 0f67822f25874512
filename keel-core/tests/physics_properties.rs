//! End-to-end checks of the simulation loop: equilibrium, determinism,
//! drag, and collision response through the public API.

use std::path::PathBuf;

use keel_core::body::{Collidable, Sphere};
use keel_core::collision::CollisionResolver;
use keel_core::environment::{Adjust, Command, Environment};
use keel_core::forces::{buoyancy_force, gravity_force, PropulsionModel, VesselForces};
use keel_core::presets::PresetLoader;
use keel_core::simulation::{BodyRef, Simulation, SimulationConfig};
use keel_core::types::{constants, BodyState, SphereProperties, VesselProperties, Vec3};

const DT: f64 = 1.0 / 60.0;

fn presets() -> PresetLoader {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PresetLoader::new(PathBuf::from(manifest_dir).join("..").join("presets"))
}

fn engine_config() -> SimulationConfig {
    SimulationConfig {
        propulsion: PropulsionModel::engine(),
        ..SimulationConfig::default()
    }
}

fn draft_height(props: &VesselProperties) -> f64 {
    props
        .equilibrium_height(constants::WATER_DENSITY)
        .expect("dinghy floats")
}

fn ball(mass: f64, pos: Vec3, vel: Vec3) -> Sphere {
    let props = SphereProperties {
        mass,
        radius: 1.0,
        drag_coefficient_air: 0.0,
    };
    let mut sphere = Sphere::new(props, pos).unwrap().with_velocity(vel);
    sphere.mark_ready();
    sphere
}

#[test]
fn concrete_buoyancy_numbers() {
    let buoyancy = buoyancy_force(2.0, 1000.0, 9.81);
    let gravity = gravity_force(500.0, 9.81);
    assert!((buoyancy.magnitude() - 19620.0).abs() < 1e-9);
    assert!((gravity.magnitude() - 4905.0).abs() < 1e-9);
    assert!(((buoyancy + gravity).y - 14715.0).abs() < 1e-9);
}

#[test]
fn vertical_force_vanishes_at_draft() {
    let props = VesselProperties::dinghy();
    let env = Environment::calm();
    let forces = VesselForces::new(PropulsionModel::sail());
    let state = BodyState::at_rest(Vec3::new(0.0, draft_height(&props), 0.0));

    let net = forces.net_force(&state, &props, &env);
    assert!(net.y.abs() < 1e-9, "got {}", net.y);
}

#[test]
fn over_buoyant_hull_settles_at_draft() {
    let mut sim = Simulation::new(Environment::calm(), SimulationConfig::default());
    let props = VesselProperties::dinghy();
    let target = draft_height(&props);
    let id = sim.add_vessel(props, BodyState::default()).unwrap();
    sim.mark_vessel_ready(id);

    let mut peak: f64 = 0.0;
    for _ in 0..1200 {
        let report = sim.step(DT);
        peak = peak.max(report.body(BodyRef::Vessel(id)).unwrap().position.y);
    }

    let state = sim.vessel(id).unwrap().state();
    assert!(peak > target, "Hull should rise past its draft first");
    assert!((state.pos.y - target).abs() < 1e-2, "settled at {}", state.pos.y);
    assert!(state.vel.magnitude() < 1e-2);
}

#[test]
fn identical_runs_are_bit_identical() {
    let run = || {
        let mut sim = Simulation::new(Environment::new(), engine_config());
        let props = VesselProperties::dinghy();
        let start = BodyState::at_rest(Vec3::new(0.0, draft_height(&props), 0.0));
        let vessel = sim.add_vessel(props, start).unwrap();
        let buoy = sim
            .add_sphere(
                SphereProperties::buoy(),
                Vec3::new(1.0, start.pos.y, 12.0),
                Vec3::ZERO,
            )
            .unwrap();
        sim.mark_vessel_ready(vessel);
        sim.mark_sphere_ready(buoy);

        let mut reports = Vec::new();
        for frame in 0..240 {
            match frame {
                0 => {
                    for _ in 0..6 {
                        sim.apply(Command::AdjustThrust(Adjust::Increase));
                    }
                }
                60 => sim.apply(Command::AdjustSteering(Adjust::Increase)),
                150 => sim.apply(Command::AdjustThrust(Adjust::Decrease)),
                _ => {}
            }
            let dt = if frame % 2 == 0 { DT } else { DT * 0.9 };
            reports.push(sim.step(dt));
        }
        reports
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(
        first.iter().any(|report| report.any_collision()),
        "The run should reach the buoy"
    );
}

#[test]
fn drag_slows_an_unpowered_hull_every_step() {
    let mut sim = Simulation::new(Environment::calm(), engine_config());
    let props = VesselProperties::dinghy();
    let start = BodyState::new(
        Vec3::new(0.0, draft_height(&props), 0.0),
        Vec3::new(3.0, 0.0, 4.0),
        0.0,
        0.0,
    );
    let id = sim.add_vessel(props, start).unwrap();
    sim.mark_vessel_ready(id);

    let mut speed = start.vel.horizontal().magnitude();
    for step in 0..300 {
        sim.step(DT);
        let next = sim.vessel(id).unwrap().state().vel.horizontal().magnitude();
        assert!(next < speed, "speed rose at step {}: {} -> {}", step, speed, next);
        speed = next;
    }
    assert!(speed < 0.01);
}

#[test]
fn sail_preset_sails_along_heading() {
    let loader = presets();
    let props = loader.load_vessel("dinghy").unwrap();
    let env = loader.load_environment("breeze").unwrap();
    let tuning = loader.load_tuning("sail").unwrap();

    let mut sim = Simulation::new(env, tuning);
    let start = BodyState::new(
        Vec3::new(0.0, draft_height(&props), 0.0),
        Vec3::ZERO,
        std::f64::consts::FRAC_PI_2,
        0.0,
    );
    let id = sim.add_vessel(props, start).unwrap();
    sim.mark_vessel_ready(id);

    for _ in 0..120 {
        sim.step(DT);
    }

    // Wind blows along +Z but the hull points along +X.
    let pos = sim.vessel(id).unwrap().state().pos;
    assert!(pos.x > 0.5, "got x={}", pos.x);
    assert!(pos.z.abs() < 1e-6, "got z={}", pos.z);
}

#[test]
fn golden_head_on_collision() {
    let mut a = ball(500.0, Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
    let mut b = ball(500.0, Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);

    let report = CollisionResolver::resolve(&mut a, &mut b, 0.7).unwrap();

    assert!((report.impulse - 2125.0).abs() < 1e-9);
    assert!((a.velocity().z + 0.75).abs() < 1e-12);
    assert!((b.velocity().z + 4.25).abs() < 1e-12);
}

#[test]
fn separating_pairs_are_never_touched() {
    let mut a = ball(80.0, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.5, 0.0, 2.0));
    let mut b = ball(120.0, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

    for _ in 0..10 {
        assert!(CollisionResolver::resolve(&mut a, &mut b, 0.9).is_none());
    }
    assert_eq!(a.velocity(), Vec3::new(0.5, 0.0, 2.0));
    assert_eq!(b.velocity(), Vec3::new(0.0, 0.0, -1.0));
}

#[test]
fn elastic_and_inelastic_limits() {
    let normal = Vec3::new(0.0, 0.0, 1.0);

    let mut a = ball(250.0, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -6.0));
    let mut b = ball(750.0, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
    let p0 = a.velocity().dot(&normal) * 250.0 + b.velocity().dot(&normal) * 750.0;
    let e0 = 0.5 * 250.0 * 36.0 + 0.5 * 750.0 * 1.0;
    CollisionResolver::resolve(&mut a, &mut b, 1.0).unwrap();
    let p1 = a.velocity().dot(&normal) * 250.0 + b.velocity().dot(&normal) * 750.0;
    let e1 = 0.5 * 250.0 * a.velocity().z.powi(2) + 0.5 * 750.0 * b.velocity().z.powi(2);
    assert!((p1 - p0).abs() < 1e-9);
    assert!((e1 - e0).abs() < 1e-9);

    let mut a = ball(250.0, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -6.0));
    let mut b = ball(750.0, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
    CollisionResolver::resolve(&mut a, &mut b, 0.0).unwrap();
    let separating = (a.velocity() - b.velocity()).dot(&normal);
    assert!(separating.abs() < 1e-12);
}
