//! Core types and constants shared by the orbit and collision systems.

use std::fmt;

use bevy::math::DVec3;
use bevy::prelude::*;

/// System sets for one simulation tick.
///
/// Chained in this order by [`crate::SimulationPlugin`], so collision
/// detection always observes positions produced earlier in the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Advance the simulation clock from the host's frame time
    Clock,
    /// Advance anomalies, spins and free-body motion
    Advance,
    /// Compose parent-relative offsets into world positions
    Compose,
    /// Detect and resolve collisions
    Collide,
}

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Upper bound applied to near-parabolic eccentricities.
///
/// Anything in `(MAX_ECCENTRICITY, 1)` is clamped so the semi-minor axis
/// stays comfortably above zero.
pub const MAX_ECCENTRICITY: f64 = 0.999;

/// Wrap an angle into `[0, 2π)`.
///
/// `rem_euclid` can round up to exactly `TAU` for tiny negative inputs, which
/// would break the half-open range.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Stable handle to a body in the [`crate::world::SimulationWorld`] arena.
///
/// The generation makes handles to despawned bodies detectably stale even
/// after their slot is reused by a new body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the world arena.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Broad classification of a simulated body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyClass {
    Star,
    #[default]
    Planet,
    Moon,
    Asteroid,
    Comet,
    Debris,
}

impl BodyClass {
    /// Transient bodies are spawned and despawned at runtime by collaborators.
    pub fn is_transient(&self) -> bool {
        matches!(self, BodyClass::Asteroid | BodyClass::Comet | BodyClass::Debris)
    }
}

/// Per-body transform handed to the rendering collaborator every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldTransform {
    /// World-space position in scene units
    pub position: DVec3,
    /// Spin about the local Y axis in radians
    pub rotation_y: f64,
}

/// Global simulation speed multiplier.
///
/// Zero pauses the simulation without destroying any state. The UI exposes
/// a 0–2 slider; any non-negative finite value is accepted.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SimulationSpeed {
    factor: f64,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl SimulationSpeed {
    /// Create a speed multiplier, clamping invalid input to zero.
    pub fn new(factor: f64) -> Self {
        let mut speed = Self::default();
        speed.set(factor);
        speed
    }

    /// Pause-equivalent speed.
    pub fn paused() -> Self {
        Self { factor: 0.0 }
    }

    /// Set the multiplier. Negative or non-finite values are clamped to zero.
    pub fn set(&mut self, factor: f64) {
        if factor.is_finite() && factor >= 0.0 {
            self.factor = factor;
        } else {
            warn!("Rejecting simulation speed {factor}, pausing instead");
            self.factor = 0.0;
        }
    }

    /// Current multiplier, `0.0` when paused.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// True when motion and spin are frozen.
    pub fn is_paused(&self) -> bool {
        self.factor == 0.0
    }
}

/// How on-rails angular rates relate to the host's frame time.
///
/// `PerFrame` applies every rate once per tick, so orbital speed follows the
/// frame rate. `Scaled` treats every rate as "per frame at `reference_hz`".
/// Free bodies always move in real elapsed time.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub enum TimeStepPolicy {
    #[default]
    PerFrame,
    Scaled {
        /// Frame rate the catalog speeds were authored for
        reference_hz: f64,
    },
}

impl TimeStepPolicy {
    /// Multiplier applied to per-tick angular rates for a frame of `dt` seconds.
    pub fn step_scale(&self, dt: f64) -> f64 {
        match *self {
            TimeStepPolicy::PerFrame => 1.0,
            TimeStepPolicy::Scaled { reference_hz } => (dt * reference_hz).max(0.0),
        }
    }
}
