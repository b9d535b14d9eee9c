//! Collision detection over the active body set.
//!
//! Detection is split into a broad phase that proposes pairs and a narrow
//! check that decides whether a proposed pair is an impact. Body counts are in
//! the tens, so the default broad phase simply proposes every pair.

use std::fmt;

use bevy::math::DVec3;
use bevy::prelude::Resource;

use super::cooldown::{CooldownRegistry, PairKey};
use super::{CollisionBody, CollisionSettings};
use crate::types::BodyHandle;

/// Contact distance multiplier: near misses within 10% register as hits.
pub const CONTACT_MARGIN: f64 = 1.1;

/// Proposes index pairs `(i, j)` with `i < j` that may be in contact.
///
/// Implementations may over-report; every proposed pair goes through the
/// same narrow check.
pub trait BroadPhase: Send + Sync + fmt::Debug {
    fn candidate_pairs(&self, bodies: &[CollisionBody]) -> Vec<(usize, usize)>;
}

/// Every unordered pair, O(n²).
#[derive(Clone, Copy, Debug, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&self, bodies: &[CollisionBody]) -> Vec<(usize, usize)> {
        let n = bodies.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        pairs
    }
}

/// A pair accepted for resolution this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionCandidate {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit vector from A's centre toward B's
    pub contact_normal: DVec3,
    /// Approach speed along the normal
    pub impact_speed: f64,
    /// Centre distance at detection time
    pub distance: f64,
    /// Sum of both radii, before the contact margin
    pub combined_radii: f64,
    /// A's velocity minus B's, missing velocities counted as zero
    pub relative_velocity: DVec3,
}

/// Narrow check for a single pair, ignoring cooldowns.
///
/// Missing velocities count as zero here; the resolver is the one that
/// refuses to act on them.
pub fn evaluate_pair(
    a: &CollisionBody,
    b: &CollisionBody,
    settings: &CollisionSettings,
) -> Option<CollisionCandidate> {
    if a.parent == Some(b.handle) || b.parent == Some(a.handle) {
        return None;
    }

    let delta = b.position - a.position;
    let distance = delta.length();
    let combined_radii = a.radius + b.radius;
    if !distance.is_finite() || distance > combined_radii * CONTACT_MARGIN {
        return None;
    }

    let contact_normal = if distance > 0.0 {
        delta / distance
    } else {
        DVec3::X
    };

    let relative = a.velocity.unwrap_or(DVec3::ZERO) - b.velocity.unwrap_or(DVec3::ZERO);
    let impact_speed = relative.dot(contact_normal);
    if impact_speed < settings.min_impact_velocity {
        return None;
    }

    Some(CollisionCandidate {
        body_a: a.handle,
        body_b: b.handle,
        contact_normal,
        impact_speed,
        distance,
        combined_radii,
        relative_velocity: relative,
    })
}

/// Broad phase plus cooldown bookkeeping.
#[derive(Resource, Debug)]
pub struct CollisionDetector {
    broad_phase: Box<dyn BroadPhase>,
    cooldowns: CooldownRegistry,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::with_broad_phase(AllPairs)
    }

    pub fn with_broad_phase(broad_phase: impl BroadPhase + 'static) -> Self {
        Self {
            broad_phase: Box::new(broad_phase),
            cooldowns: CooldownRegistry::new(),
        }
    }

    /// Accepted candidates for this tick, in broad-phase order.
    ///
    /// Expired cooldowns are evicted first; every accepted pair is stamped
    /// with `now_ms`.
    pub fn detect(
        &mut self,
        bodies: &[CollisionBody],
        settings: &CollisionSettings,
        now_ms: f64,
    ) -> Vec<CollisionCandidate> {
        // A TTL shorter than the window would let a pair re-fire early
        let ttl = settings.cooldown_ms * settings.cooldown_ttl_multiplier.max(1.0);
        self.cooldowns.prune(now_ms, ttl);

        let mut accepted = Vec::new();
        for (i, j) in self.broad_phase.candidate_pairs(bodies) {
            let (Some(a), Some(b)) = (bodies.get(i), bodies.get(j)) else {
                continue;
            };
            let Some(candidate) = evaluate_pair(a, b, settings) else {
                continue;
            };

            let key = PairKey::new(a.handle, b.handle);
            if self.cooldowns.is_cooling(key, now_ms, settings.cooldown_ms) {
                continue;
            }
            self.cooldowns.stamp(key, now_ms);
            accepted.push(candidate);
        }
        accepted
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    /// Drop cooldown entries for a despawned body.
    pub fn forget(&mut self, handle: BodyHandle) {
        self.cooldowns.forget(handle);
    }

    pub fn reset(&mut self) {
        self.cooldowns.clear();
    }
}
