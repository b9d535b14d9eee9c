//! Host-independent driver for the tick pipeline.
//!
//! Runs the same steps as the Bevy systems, in the same order, for hosts that
//! bring their own frame loop (and for tests that want to step by hand).

use crate::catalog::OrbitCatalog;
use crate::collision::{
    CollisionDetector, CollisionEvent, CollisionSettings, CollisionState, log_impact,
    run_collision_pass,
};
use crate::orbit::PhysicsSettings;
use crate::time::SimulationClock;
use crate::types::{SimulationSpeed, TimeStepPolicy};
use crate::world::{BodyNames, SimulationWorld, WorldError};

/// World, detector, clock and settings for one simulation.
#[derive(Debug, Default)]
pub struct Simulation {
    pub world: SimulationWorld,
    pub detector: CollisionDetector,
    pub clock: SimulationClock,
    pub speed: SimulationSpeed,
    pub time_step: TimeStepPolicy,
    pub physics: PhysicsSettings,
    pub collisions: CollisionSettings,
    pub collision_state: CollisionState,
}

impl Simulation {
    pub fn new(world: SimulationWorld) -> Self {
        Self {
            world,
            ..Default::default()
        }
    }

    /// Spawn every body in `catalog` into a fresh simulation.
    pub fn from_catalog(catalog: &OrbitCatalog) -> Result<(Self, BodyNames), WorldError> {
        let mut world = SimulationWorld::new();
        let names = world.spawn_catalog(catalog)?;
        Ok((Self::new(world), names))
    }

    /// Run one tick of `dt` real seconds and return the resolved collisions.
    ///
    /// Order: clock, anomalies and free bodies, hierarchy composition (with
    /// velocity tracking), then collision detection and resolution.
    pub fn tick(&mut self, dt: f64) -> Vec<CollisionEvent> {
        self.clock.advance(dt);
        self.world
            .advance(&self.speed, self.time_step, &self.physics, self.clock.delta_secs);
        self.world.compose(self.clock.delta_secs);

        let pass = run_collision_pass(
            &mut self.world,
            &mut self.detector,
            &self.collisions,
            self.clock.elapsed_ms,
        );

        self.collision_state.skipped_missing_state += pass.skipped.len() as u64;
        for event in &pass.events {
            log_impact(&self.world, event);
            self.collision_state.total_collisions += 1;
            self.collision_state.last_collision = Some(event.clone());
        }
        pass.events
    }
}
