//! Simulation clock driven by the host's frame callback.
//!
//! The clock tracks real (unscaled) elapsed time. Collision cooldowns are
//! measured against it, so pausing or slowing the simulation does not stretch
//! the cooldown window.

use bevy::prelude::*;

use crate::types::SimulationSet;

/// Plugin providing clock advancement.
pub struct TimePlugin;

impl Plugin for TimePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>()
            .add_systems(Update, advance_clock.in_set(SimulationSet::Clock));
    }
}

/// Real-time clock for the current tick.
#[derive(Resource, Clone, Debug, Default)]
pub struct SimulationClock {
    /// Milliseconds elapsed since the simulation started
    pub elapsed_ms: f64,
    /// Length of the current frame in seconds
    pub delta_secs: f64,
    /// Number of ticks taken
    pub ticks: u64,
}

impl SimulationClock {
    /// Start a new tick of `dt` seconds. Negative or non-finite frame times
    /// count as zero.
    pub fn advance(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta_secs = dt;
        self.elapsed_ms += dt * 1000.0;
        self.ticks += 1;
    }
}

/// Advance the clock by Bevy's frame delta.
fn advance_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.advance(time.delta_secs_f64());
}
