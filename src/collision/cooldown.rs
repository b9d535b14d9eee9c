//! Per-pair collision cooldowns.
//!
//! Two bodies that keep touching would otherwise fire an event every tick.
//! Each unordered pair remembers when it last collided; entries older than a
//! TTL are evicted so the table does not grow with every transient body that
//! ever existed.

use std::collections::HashMap;

use bevy::log::debug;

use crate::types::BodyHandle;

/// Unordered pair key: `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: BodyHandle,
    high: BodyHandle,
}

impl PairKey {
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.low == handle || self.high == handle
    }

    pub fn handles(&self) -> (BodyHandle, BodyHandle) {
        (self.low, self.high)
    }
}

/// Last collision timestamp (ms) per body pair.
#[derive(Clone, Debug, Default)]
pub struct CooldownRegistry {
    last: HashMap<PairKey, f64>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while `now_ms` is inside the pair's cooldown window.
    pub fn is_cooling(&self, key: PairKey, now_ms: f64, cooldown_ms: f64) -> bool {
        self.last
            .get(&key)
            .is_some_and(|&last| now_ms - last < cooldown_ms)
    }

    pub fn stamp(&mut self, key: PairKey, now_ms: f64) {
        self.last.insert(key, now_ms);
    }

    pub fn last_collision(&self, key: PairKey) -> Option<f64> {
        self.last.get(&key).copied()
    }

    /// Drop entries last stamped more than `ttl_ms` ago. Returns how many
    /// were evicted.
    pub fn prune(&mut self, now_ms: f64, ttl_ms: f64) -> usize {
        let before = self.last.len();
        self.last.retain(|_, &mut last| now_ms - last <= ttl_ms);
        let evicted = before - self.last.len();
        if evicted > 0 {
            debug!("Evicted {} expired collision cooldowns", evicted);
        }
        evicted
    }

    /// Drop every entry involving `handle`.
    pub fn forget(&mut self, handle: BodyHandle) {
        self.last.retain(|key, _| !key.contains(handle));
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
