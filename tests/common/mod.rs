//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::math::DVec3;
use orrery::catalog::{OrbitCatalog, REFERENCE_BODY, calibrate_orbital_speeds, solar_system};
use orrery::collision::mass_proxy;
use orrery::simulation::Simulation;
use orrery::types::BodyClass;
use orrery::world::{BodyNames, BodySpec};

/// Frame time used by the integration tests (60 Hz).
pub const FRAME: f64 = 1.0 / 60.0;

/// Built-in catalog with calibrated speeds.
pub fn calibrated_solar_system() -> OrbitCatalog {
    let mut catalog = solar_system().expect("built-in catalog is valid");
    calibrate_orbital_speeds(&mut catalog, REFERENCE_BODY).expect("reference body exists");
    catalog
}

/// Simulation loaded with the calibrated solar system.
pub fn solar_simulation() -> (Simulation, BodyNames) {
    Simulation::from_catalog(&calibrated_solar_system()).expect("catalog spawns")
}

/// Comet with a tracked velocity.
pub fn comet(name: &str, position: DVec3, velocity: DVec3, radius: f64) -> BodySpec {
    BodySpec::free(name, BodyClass::Comet, position, velocity, radius)
}

/// Total momentum of the given `(radius, velocity)` pairs.
pub fn total_momentum(bodies: &[(f64, DVec3)]) -> DVec3 {
    bodies
        .iter()
        .map(|&(radius, velocity)| velocity * mass_proxy(radius))
        .sum()
}

/// Run `ticks` frames and collect every collision event.
pub fn run(sim: &mut Simulation, ticks: usize) -> Vec<orrery::collision::CollisionEvent> {
    (0..ticks).flat_map(|_| sim.tick(FRAME)).collect()
}
