//! Orrery - Celestial Kinematics and Collision Core
//!
//! Moves a catalog of celestial bodies along precomputed orbits, composes
//! parent-relative positions into world space, and detects and resolves
//! body-body impacts. Rendering, UI and audio are left to the host; this
//! crate hands them per-body transforms and a stream of collision events.

pub mod catalog;
pub mod collision;
pub mod hierarchy;
pub mod orbit;
pub mod simulation;
pub mod time;
pub mod types;
pub mod world;

#[cfg(test)]
pub mod test_utils;

use bevy::prelude::*;

use collision::CollisionPlugin;
use orbit::OrbitPlugin;
use time::TimePlugin;
use types::SimulationSet;

/// Everything needed to run the simulation inside a Bevy app.
///
/// The tick is chained clock → advance → compose → collide, so collision
/// detection always sees positions from the same frame.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Clock,
                SimulationSet::Advance,
                SimulationSet::Compose,
                SimulationSet::Collide,
            )
                .chain(),
        )
        .add_plugins((TimePlugin, OrbitPlugin, CollisionPlugin));
    }
}
