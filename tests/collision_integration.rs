//! Integration tests for the detect → resolve pipeline.

mod common;

use approx::assert_relative_eq;
use bevy::math::DVec3;
use common::{FRAME, comet, run, solar_simulation, total_momentum};
use orrery::collision::CollisionSettings;
use orrery::orbit::OrbitKind;
use orrery::simulation::Simulation;
use orrery::types::{BodyClass, BodyHandle, SimulationSpeed};
use orrery::world::{BodySpec, SimulationWorld};

fn head_on(elasticity: f64) -> (Simulation, [BodyHandle; 2]) {
    let mut world = SimulationWorld::new();
    let a = world
        .spawn(comet("A", DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0), 1.0))
        .unwrap();
    let b = world
        .spawn(comet("B", DVec3::new(3.2, 0.0, 0.0), DVec3::ZERO, 2.0))
        .unwrap();

    let mut sim = Simulation::new(world);
    sim.collisions = CollisionSettings {
        elasticity,
        ..Default::default()
    };
    (sim, [a, b])
}

#[test]
fn test_restitution_scenario() {
    let (mut sim, [a, b]) = head_on(0.7);

    let events = sim.tick(FRAME);
    assert_eq!(events.len(), 1);
    let approach = events[0].impact_speed;
    assert!(approach > 0.0);

    let va = sim.world.get(a).unwrap().state.velocity.unwrap();
    let vb = sim.world.get(b).unwrap().state.velocity.unwrap();
    let separation = (vb - va).dot(events[0].contact_normal);
    assert_relative_eq!(separation, 0.7 * approach, epsilon = 1e-12);
}

#[test]
fn test_elastic_collision_conserves_momentum() {
    let (mut sim, [a, b]) = head_on(1.0);
    let before = total_momentum(&[(1.0, DVec3::new(3.0, 0.0, 0.0)), (2.0, DVec3::ZERO)]);

    assert_eq!(sim.tick(FRAME).len(), 1);

    let va = sim.world.get(a).unwrap().state.velocity.unwrap();
    let vb = sim.world.get(b).unwrap().state.velocity.unwrap();
    let after = total_momentum(&[(1.0, va), (2.0, vb)]);
    assert!((after - before).length() < 1e-6);
}

#[test]
fn test_resolved_bodies_no_longer_overlap() {
    let (mut sim, [a, b]) = head_on(0.7);
    sim.tick(FRAME);

    let pa = sim.world.transform(a).unwrap().position;
    let pb = sim.world.transform(b).unwrap().position;
    assert!(pa.distance(pb) >= 3.0 - 1e-9);
}

#[test]
fn test_cooldown_yields_exactly_one_event() {
    // A resting pair stays in contact while paused; with no approach-speed
    // floor only the cooldown keeps it from firing every tick
    let mut world = SimulationWorld::new();
    world
        .spawn(comet("A", DVec3::ZERO, DVec3::X, 1.0))
        .unwrap();
    world
        .spawn(comet("B", DVec3::new(1.9, 0.0, 0.0), -DVec3::X, 1.0))
        .unwrap();
    let mut sim = Simulation::new(world);
    sim.speed = SimulationSpeed::paused();
    sim.collisions.min_impact_velocity = f64::NEG_INFINITY;

    // 1.5 s of frames, all inside the 2 s window
    let events = run(&mut sim, 90);
    assert_eq!(events.len(), 1);
    assert_eq!(sim.collision_state.total_collisions, 1);

    // One more window opens within the next second
    let events = run(&mut sim, 60);
    assert_eq!(events.len(), 1);
    assert_eq!(sim.collision_state.total_collisions, 2);
}

#[test]
fn test_moons_never_collide_with_parent() {
    let mut world = SimulationWorld::new();
    let planet = world
        .spawn(
            BodySpec::orbiting("Planet", BodyClass::Planet, OrbitKind::circular(30.0), 0.01, 2.0)
                .with_velocity_tracking(),
        )
        .unwrap();
    // Grazing the planet's surface on a fast orbit
    world
        .spawn(
            BodySpec::orbiting("Moon", BodyClass::Moon, OrbitKind::circular(2.1), 0.2, 0.3)
                .with_parent(planet)
                .with_velocity_tracking(),
        )
        .unwrap();

    let mut sim = Simulation::new(world);
    assert!(run(&mut sim, 600).is_empty());
}

#[test]
fn test_sibling_moons_can_collide() {
    let mut world = SimulationWorld::new();
    let planet = world
        .spawn(BodySpec::orbiting(
            "Planet",
            BodyClass::Planet,
            OrbitKind::Stationary,
            0.0,
            1.0,
        ))
        .unwrap();
    // A fast moon catches a parked one on the same circle
    for (name, speed, anomaly) in [("Chaser", 0.1, 0.0), ("Parked", 0.0, 0.3)] {
        world
            .spawn(
                BodySpec::orbiting(name, BodyClass::Moon, OrbitKind::circular(5.0), speed, 0.3)
                    .with_parent(planet)
                    .with_anomaly(anomaly)
                    .with_velocity_tracking(),
            )
            .unwrap();
    }

    let mut sim = Simulation::new(world);
    let events = run(&mut sim, 10);
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| !e.involves(planet)));
}

#[test]
fn test_untracked_body_is_skipped_not_fatal() {
    let mut world = SimulationWorld::new();
    world
        .spawn(comet("Moving", DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), 1.0))
        .unwrap();
    world
        .spawn(comet("Parked", DVec3::new(2.1, 0.0, 0.0), DVec3::ZERO, 1.0).without_velocity())
        .unwrap();
    let mut sim = Simulation::new(world);

    assert!(sim.tick(FRAME).is_empty());
    assert_eq!(sim.collision_state.skipped_missing_state, 1);
    // The rest of the simulation keeps running
    sim.tick(FRAME);
    assert_eq!(sim.clock.ticks, 2);
}

#[test]
fn test_comet_strikes_tracked_planet_while_paused() {
    let (mut sim, names) = solar_simulation();
    let earth = names.get("Earth").unwrap();
    sim.world.set_velocity_tracking(earth, true).unwrap();
    sim.speed = SimulationSpeed::paused();

    let target = sim.world.transform(earth).unwrap().position;
    let comet = sim
        .world
        .spawn(comet("Comet", target - DVec3::new(1.2, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0), 0.2))
        .unwrap();

    let events = sim.tick(FRAME);
    assert_eq!(events.len(), 1);
    assert!(events[0].involves(comet) && events[0].involves(earth));
    assert_relative_eq!(events[0].impact_speed, 2.0, epsilon = 1e-9);
    assert_relative_eq!(events[0].debris_intensity, 2.0, epsilon = 1e-9);
    assert_eq!(events[0].timestamp_ms, sim.clock.elapsed_ms);

    // The comet bounces back; the planet barely moves
    let comet_velocity = sim.world.get(comet).unwrap().state.velocity.unwrap();
    assert!(comet_velocity.x < 0.0);

    // Despawning the comet clears its cooldowns on the next pass
    sim.world.despawn(comet).unwrap();
    sim.tick(FRAME);
    assert!(sim.detector.cooldowns().is_empty());
}

#[test]
fn test_untracked_planet_skips_comet_impact() {
    let (mut sim, names) = solar_simulation();
    let earth = names.get("Earth").unwrap();
    sim.speed = SimulationSpeed::paused();

    let target = sim.world.transform(earth).unwrap().position;
    sim.world
        .spawn(comet("Comet", target - DVec3::new(1.2, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0), 0.2))
        .unwrap();

    assert!(sim.tick(FRAME).is_empty());
    assert_eq!(sim.collision_state.skipped_missing_state, 1);
}
