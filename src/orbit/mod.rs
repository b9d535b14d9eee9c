//! Per-tick orbit state updates.
//!
//! Every on-rails body advances its anomaly by
//! `base_orbital_speed × speed_factor` (times the [`TimeStepPolicy`] scale),
//! wrapped into `[0, 2π)`, and its spin by
//! `rotation_speed × speed_factor`. The new anomaly is turned into a
//! parent-relative position by [`OrbitKind::local_position`]; composing that
//! with the parent's world position is the hierarchy's job.
//!
//! Runs in Bevy's `Update` schedule as part of [`SimulationSet`].

pub mod ballistic;
mod shape;

#[cfg(test)]
mod proptest_orbit;

use bevy::math::DVec3;
use bevy::prelude::*;

pub use ballistic::{GravitySource, PhysicsSettings, gravity_acceleration, step_free_body};
pub use shape::{Ellipse, OrbitKind};

use crate::time::SimulationClock;
use crate::types::{SimulationSet, SimulationSpeed, TimeStepPolicy, wrap_angle};
use crate::world::SimulationWorld;

/// Plugin providing orbit advancement and hierarchy composition.
pub struct OrbitPlugin;

impl Plugin for OrbitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationWorld>()
            .init_resource::<SimulationSpeed>()
            .init_resource::<TimeStepPolicy>()
            .init_resource::<PhysicsSettings>()
            .add_systems(
                Update,
                (
                    advance_orbits.in_set(SimulationSet::Advance),
                    compose_hierarchy.in_set(SimulationSet::Compose),
                ),
            );
    }
}

/// How a body moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Fixed precomputed path around the parent (or origin)
    Orbital {
        orbit: OrbitKind,
        /// Anomaly advance in radians per tick at speed factor 1
        base_speed: f64,
    },
    /// Velocity-driven motion in world space
    Free,
}

/// Mutable per-body simulation state.
#[derive(Clone, Debug, Default)]
pub struct BodyState {
    /// Anomaly angle in `[0, 2π)`
    pub anomaly: f64,
    /// Spin about the local Y axis in `[0, 2π)`
    pub rotation: f64,
    /// Parent-relative position from the last orbit update
    pub local_position: DVec3,
    /// World position from the last hierarchy composition
    pub position: DVec3,
    /// Velocity in scene units per second, if tracked
    pub velocity: Option<DVec3>,
    /// Set when the body produced a non-finite position; it stops updating
    pub frozen: bool,
}

/// Advance an anomaly by `delta` radians, wrapping into `[0, 2π)`.
#[inline]
pub fn advance_anomaly(anomaly: f64, delta: f64) -> f64 {
    wrap_angle(anomaly + delta)
}

/// Advance anomalies, spins and free bodies by one tick.
fn advance_orbits(
    mut world: ResMut<SimulationWorld>,
    speed: Res<SimulationSpeed>,
    policy: Res<TimeStepPolicy>,
    physics: Res<PhysicsSettings>,
    clock: Res<SimulationClock>,
) {
    world.advance(&speed, *policy, &physics, clock.delta_secs);
}

/// Compose local offsets into world positions.
fn compose_hierarchy(mut world: ResMut<SimulationWorld>, clock: Res<SimulationClock>) {
    world.compose(clock.delta_secs);
}
