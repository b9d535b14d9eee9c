//! Body-body collisions: detection, cooldowns and impulse response.
//!
//! Each tick, after the hierarchy has composed this tick's positions:
//! 1. Cooldowns of despawned bodies are dropped
//! 2. The detector proposes accepted candidates (and stamps their cooldowns)
//! 3. Each candidate is resolved in order, mutating the world
//! 4. A [`CollisionEvent`] is written per resolved pair
//!
//! Resolution is sequential: resolving one pair can move a body that appears
//! in a later pair of the same tick.

pub mod cooldown;
pub mod detector;
pub mod resolver;

#[cfg(test)]
mod proptest_collision;

use bevy::log::{info, warn};
use bevy::math::DVec3;
use bevy::prelude::*;

pub use cooldown::{CooldownRegistry, PairKey};
pub use detector::{
    AllPairs, BroadPhase, CONTACT_MARGIN, CollisionCandidate, CollisionDetector, evaluate_pair,
};
pub use resolver::{ContactResponse, ResolveError, compute_response, mass_proxy, resolve};

use crate::time::SimulationClock;
use crate::types::{BodyHandle, SimulationSet};
use crate::world::SimulationWorld;

/// Collision tuning.
#[derive(Resource, Clone, Debug)]
pub struct CollisionSettings {
    /// Master switch. Default: true.
    pub enabled: bool,
    /// Coefficient of restitution in `[0, 1]`. Default: 0.7.
    pub elasticity: f64,
    /// Minimum approach speed for an impact. Default: 0.05.
    pub min_impact_velocity: f64,
    /// Per-pair cooldown window in milliseconds. Default: 2000.
    pub cooldown_ms: f64,
    /// Multiplier from impact speed to debris intensity. Default: 1.0.
    pub debris_intensity_scale: f64,
    /// Cooldown entries expire after this many windows. Default: 4.0.
    pub cooldown_ttl_multiplier: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            elasticity: 0.7,
            min_impact_velocity: 0.05,
            cooldown_ms: 2000.0,
            debris_intensity_scale: 1.0,
            cooldown_ttl_multiplier: 4.0,
        }
    }
}

impl CollisionSettings {
    /// Elasticity as used by the impulse, clamped to `[0, 1]`.
    ///
    /// NaN falls back to a perfectly inelastic response.
    pub fn restitution(&self) -> f64 {
        let e = self.elasticity;
        if (0.0..=1.0).contains(&e) {
            return e;
        }
        let clamped = if e.is_nan() { 0.0 } else { e.clamp(0.0, 1.0) };
        warn!("Elasticity {e} is outside [0, 1], using {clamped}");
        clamped
    }
}

/// Snapshot of one body as seen by the detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBody {
    pub handle: BodyHandle,
    pub position: DVec3,
    pub velocity: Option<DVec3>,
    pub radius: f64,
    pub parent: Option<BodyHandle>,
}

/// A resolved collision, for effects and notification collaborators.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Radius-weighted point between the corrected centres
    pub contact_point: DVec3,
    /// Unit normal from A toward B
    pub contact_normal: DVec3,
    /// Approach speed along the normal before the impulse
    pub impact_speed: f64,
    pub debris_intensity: f64,
    /// Simulation clock time of the impact in milliseconds
    pub timestamp_ms: f64,
}

impl CollisionEvent {
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }
}

/// Running collision statistics.
///
/// Keeps the most recent event so late readers can still show it after the
/// message has been consumed.
#[derive(Resource, Clone, Debug, Default)]
pub struct CollisionState {
    pub last_collision: Option<CollisionEvent>,
    pub total_collisions: u64,
    /// Pairs skipped because a body had no tracked velocity
    pub skipped_missing_state: u64,
}

impl CollisionState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_collision(&self) -> bool {
        self.last_collision.is_some()
    }
}

/// Outcome of one detection/resolution pass.
#[derive(Clone, Debug, Default)]
pub struct CollisionPass {
    pub events: Vec<CollisionEvent>,
    pub skipped: Vec<ResolveError>,
}

/// Detect and resolve every collision among the world's current positions.
pub fn run_collision_pass(
    world: &mut SimulationWorld,
    detector: &mut CollisionDetector,
    settings: &CollisionSettings,
    now_ms: f64,
) -> CollisionPass {
    for handle in world.take_despawned() {
        detector.forget(handle);
    }

    let mut pass = CollisionPass::default();
    if !settings.enabled {
        return pass;
    }

    let bodies = world.collision_bodies();
    for candidate in detector.detect(&bodies, settings, now_ms) {
        match resolve(world, &candidate, settings, now_ms) {
            Ok(event) => pass.events.push(event),
            Err(err) => {
                warn!(
                    "Skipping collision {} / {}: {}",
                    candidate.body_a, candidate.body_b, err
                );
                pass.skipped.push(err);
            }
        }
    }
    pass
}

pub(crate) fn log_impact(world: &SimulationWorld, event: &CollisionEvent) {
    let name = |h: BodyHandle| world.get(h).map_or("?", |b| b.name.as_str());
    info!(
        "IMPACT! {} hit {} at {:.3} (debris {:.2})",
        name(event.body_a),
        name(event.body_b),
        event.impact_speed,
        event.debris_intensity,
    );
}

/// Plugin providing body-body collisions.
pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CollisionEvent>()
            .init_resource::<CollisionSettings>()
            .init_resource::<CollisionState>()
            .init_resource::<CollisionDetector>()
            .add_systems(
                Update,
                detect_and_resolve_collisions.in_set(SimulationSet::Collide),
            );
    }
}

fn detect_and_resolve_collisions(
    mut world: ResMut<SimulationWorld>,
    mut detector: ResMut<CollisionDetector>,
    settings: Res<CollisionSettings>,
    clock: Res<SimulationClock>,
    mut state: ResMut<CollisionState>,
    mut events: MessageWriter<CollisionEvent>,
) {
    let pass = run_collision_pass(&mut world, &mut detector, &settings, clock.elapsed_ms);
    state.skipped_missing_state += pass.skipped.len() as u64;

    for event in pass.events {
        log_impact(&world, &event);
        state.total_collisions += 1;
        state.last_collision = Some(event.clone());
        events.write(event);
    }
}
