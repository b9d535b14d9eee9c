//! World registry: every simulated body in a dense arena.
//!
//! Bodies are addressed by generational [`BodyHandle`]s so a handle to a
//! despawned comet can never silently alias the debris that reused its slot.
//! The name → handle table produced by [`SimulationWorld::spawn_catalog`] is
//! returned to the caller; the world itself only knows handles.

use std::collections::HashMap;

use bevy::log::{info, warn};
use bevy::math::DVec3;
use bevy::prelude::Resource;

use crate::catalog::{CatalogError, OrbitCatalog, RingSpec};
use crate::collision::CollisionBody;
use crate::hierarchy::{RingTransform, TransformHierarchy};
use crate::orbit::{
    BodyState, GravitySource, Motion, OrbitKind, PhysicsSettings, advance_anomaly, step_free_body,
};
use crate::types::{
    BodyClass, BodyHandle, DEG_TO_RAD, SimulationSpeed, TimeStepPolicy, WorldTransform, wrap_angle,
};

/// Errors from spawning, despawning or looking up bodies.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("body handle {0} is stale or unknown")]
    StaleHandle(BodyHandle),

    #[error("body `{name}`: radius {value} must be non-negative and finite")]
    InvalidRadius { name: String, value: f64 },

    #[error("free body `{0}` cannot orbit a parent")]
    FreeBodyWithParent(String),

    #[error("body `{0}`: initial state is not finite")]
    NonFiniteState(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Everything needed to spawn a body.
#[derive(Clone, Debug)]
pub struct BodySpec {
    pub name: String,
    pub class: BodyClass,
    pub motion: Motion,
    pub radius: f64,
    pub parent: Option<BodyHandle>,
    /// Spin advance in radians per tick at speed factor 1
    pub rotation_speed: f64,
    /// Starting anomaly in radians (on-rails bodies)
    pub initial_anomaly: f64,
    /// Starting world position (free bodies)
    pub position: DVec3,
    /// Starting velocity (free bodies); `None` leaves the body untracked
    pub velocity: Option<DVec3>,
    /// Derive velocity from position changes (on-rails bodies)
    pub track_velocity: bool,
    pub rings: Vec<RingSpec>,
}

impl BodySpec {
    /// A body on a fixed orbit.
    pub fn orbiting(
        name: impl Into<String>,
        class: BodyClass,
        orbit: OrbitKind,
        base_speed: f64,
        radius: f64,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            motion: Motion::Orbital { orbit, base_speed },
            radius,
            parent: None,
            rotation_speed: 0.0,
            initial_anomaly: 0.0,
            position: DVec3::ZERO,
            velocity: None,
            track_velocity: false,
            rings: Vec::new(),
        }
    }

    /// A velocity-driven body at a world position.
    pub fn free(
        name: impl Into<String>,
        class: BodyClass,
        position: DVec3,
        velocity: DVec3,
        radius: f64,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            motion: Motion::Free,
            radius,
            parent: None,
            rotation_speed: 0.0,
            initial_anomaly: 0.0,
            position,
            velocity: Some(velocity),
            track_velocity: false,
            rings: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: BodyHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_rotation(mut self, rotation_speed: f64) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_anomaly(mut self, anomaly: f64) -> Self {
        self.initial_anomaly = anomaly;
        self
    }

    pub fn with_velocity_tracking(mut self) -> Self {
        self.track_velocity = true;
        self
    }

    /// Drop the velocity so the body is not part of velocity tracking.
    pub fn without_velocity(mut self) -> Self {
        self.velocity = None;
        self.track_velocity = false;
        self
    }

    pub fn with_ring(mut self, ring: RingSpec) -> Self {
        self.rings.push(ring);
        self
    }
}

/// A live body.
#[derive(Clone, Debug)]
pub struct Body {
    pub name: String,
    pub class: BodyClass,
    /// On-rails orbit or free flight
    pub motion: Motion,
    /// Collision radius in world units
    pub radius: f64,
    /// Spin advance in radians per tick at speed factor 1
    pub rotation_speed: f64,
    /// Derive velocity from displacement each tick
    pub track_velocity: bool,
    pub rings: Vec<RingSpec>,
    /// Per-tick mutable state
    pub state: BodyState,
    parent: Option<BodyHandle>,
}

impl Body {
    pub fn parent(&self) -> Option<BodyHandle> {
        self.parent
    }

    pub fn transform(&self) -> WorldTransform {
        WorldTransform {
            position: self.state.position,
            rotation_y: self.state.rotation,
        }
    }

    fn freeze(&mut self, reason: &str) {
        warn!(
            "Freezing body `{}` after {}; last position {:?}",
            self.name, reason, self.state.position
        );
        self.state.frozen = true;
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Name → handle lookup owned by whoever loaded the catalog.
#[derive(Resource, Clone, Debug, Default)]
pub struct BodyNames {
    by_name: HashMap<String, BodyHandle>,
}

impl BodyNames {
    pub fn get(&self, name: &str) -> Option<BodyHandle> {
        self.by_name.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: BodyHandle) {
        self.by_name.insert(name.into(), handle);
    }

    pub fn remove(&mut self, name: &str) -> Option<BodyHandle> {
        self.by_name.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, BodyHandle)> {
        self.by_name.iter().map(|(name, &handle)| (name.as_str(), handle))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Arena of all simulated bodies plus their transform hierarchy.
#[derive(Resource, Clone, Debug, Default)]
pub struct SimulationWorld {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    hierarchy: TransformHierarchy,
    despawned: Vec<BodyHandle>,
}

impl SimulationWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn every catalog entry in order and return the name lookup.
    pub fn spawn_catalog(&mut self, catalog: &OrbitCatalog) -> Result<BodyNames, WorldError> {
        if !catalog.is_calibrated() {
            info!("Spawning uncalibrated orbit catalog");
        }

        let mut names = BodyNames::default();
        for entry in catalog.entries() {
            let orbit = entry.elements.orbit_kind(&entry.name)?;
            let parent = match &entry.parent {
                Some(parent) => Some(names.get(parent).ok_or_else(|| {
                    CatalogError::UnknownParent {
                        name: entry.name.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };

            let mut spec = BodySpec::orbiting(
                entry.name.clone(),
                entry.class,
                orbit,
                entry.elements.base_orbital_speed,
                entry.elements.radius,
            )
            .with_rotation(entry.elements.rotation_speed)
            .with_anomaly(entry.initial_anomaly_deg * DEG_TO_RAD);
            spec.parent = parent;
            spec.rings = entry.rings.clone();

            let handle = self.spawn(spec)?;
            names.insert(entry.name.clone(), handle);
        }

        info!("Spawned {} bodies from orbit catalog", names.len());
        Ok(names)
    }

    /// Spawn a body and place it immediately.
    pub fn spawn(&mut self, spec: BodySpec) -> Result<BodyHandle, WorldError> {
        if !spec.radius.is_finite() || spec.radius < 0.0 {
            return Err(WorldError::InvalidRadius {
                name: spec.name,
                value: spec.radius,
            });
        }

        let finite = spec.initial_anomaly.is_finite()
            && spec.rotation_speed.is_finite()
            && spec.position.is_finite()
            && spec.velocity.is_none_or(|v| v.is_finite())
            && match spec.motion {
                Motion::Orbital { base_speed, .. } => base_speed.is_finite(),
                Motion::Free => true,
            };
        if !finite {
            return Err(WorldError::NonFiniteState(spec.name));
        }

        if let Some(parent) = spec.parent {
            if matches!(spec.motion, Motion::Free) {
                return Err(WorldError::FreeBodyWithParent(spec.name));
            }
            if !self.contains(parent) {
                return Err(WorldError::StaleHandle(parent));
            }
        }

        let anomaly = wrap_angle(spec.initial_anomaly);
        let (local, velocity) = match spec.motion {
            Motion::Orbital { orbit, .. } => (
                orbit.local_position(anomaly),
                spec.track_velocity.then_some(DVec3::ZERO),
            ),
            Motion::Free => (spec.position, spec.velocity),
        };

        let handle = self.allocate();
        let index = handle.index();
        self.hierarchy.insert(index, spec.parent.map(|p| p.index()));
        self.hierarchy.set_local(index, local, 0.0);
        self.hierarchy.propagate();
        let position = self
            .hierarchy
            .world(index)
            .map_or(local, |world| world.position);

        self.slots[index].body = Some(Body {
            name: spec.name,
            class: spec.class,
            motion: spec.motion,
            radius: spec.radius,
            rotation_speed: spec.rotation_speed,
            track_velocity: spec.track_velocity,
            rings: spec.rings,
            state: BodyState {
                anomaly,
                rotation: 0.0,
                local_position: local,
                position,
                velocity,
                frozen: false,
            },
            parent: spec.parent,
        });

        Ok(handle)
    }

    /// Despawn a body and all of its descendants.
    ///
    /// Returns every removed handle, the requested one first.
    pub fn despawn(&mut self, handle: BodyHandle) -> Result<Vec<BodyHandle>, WorldError> {
        if !self.contains(handle) {
            return Err(WorldError::StaleHandle(handle));
        }

        let mut removed = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let children: Vec<usize> = self.hierarchy.children(current.index()).to_vec();
            stack.extend(children.into_iter().rev().map(|c| self.handle_at(c)));
            removed.push(current);
        }

        for &gone in removed.iter().rev() {
            self.hierarchy.remove(gone.index());
            let slot = &mut self.slots[gone.index()];
            slot.body = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_slots.push(gone.index() as u32);
            self.despawned.push(gone);
        }

        Ok(removed)
    }

    fn allocate(&mut self) -> BodyHandle {
        match self.free_slots.pop() {
            Some(index) => BodyHandle::new(index, self.slots[index as usize].generation),
            None => {
                self.slots.push(Slot::default());
                BodyHandle::new((self.slots.len() - 1) as u32, 0)
            }
        }
    }

    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle::new(index as u32, self.slots[index].generation)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.generation == handle.generation() && s.body.is_some())
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_mut()
    }

    /// Mutable access to two distinct live bodies at once.
    pub fn pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut Body, &mut Body)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (lo, hi) = if a.index() < b.index() {
            (a.index(), b.index())
        } else {
            (b.index(), a.index())
        };
        let (left, right) = self.slots.split_at_mut(hi);
        let lo_body = left[lo].body.as_mut()?;
        let hi_body = right[0].body.as_mut()?;

        if a.index() < b.index() {
            Some((lo_body, hi_body))
        } else {
            Some((hi_body, lo_body))
        }
    }

    /// Live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.body
                .as_ref()
                .map(|body| (BodyHandle::new(i as u32, slot.generation), body))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn transform(&self, handle: BodyHandle) -> Option<WorldTransform> {
        self.get(handle).map(Body::transform)
    }

    /// Transforms of the ring decorations attached to `handle`.
    pub fn ring_transforms(&self, handle: BodyHandle) -> Vec<RingTransform> {
        self.get(handle)
            .map(|body| {
                body.rings
                    .iter()
                    .filter_map(|ring| self.hierarchy.ring_transform(handle.index(), ring))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, handle: BodyHandle) -> Option<BodyHandle> {
        self.get(handle)?.parent
    }

    /// Direct children of `handle` in spawn order.
    pub fn children(&self, handle: BodyHandle) -> Vec<BodyHandle> {
        if !self.contains(handle) {
            return Vec::new();
        }
        self.hierarchy
            .children(handle.index())
            .iter()
            .map(|&c| self.handle_at(c))
            .collect()
    }

    /// Opt an on-rails body in or out of velocity tracking.
    ///
    /// Catalog bodies start untracked; collisions involving them are skipped
    /// until they carry a velocity.
    pub fn set_velocity_tracking(
        &mut self,
        handle: BodyHandle,
        enabled: bool,
    ) -> Result<(), WorldError> {
        let body = self
            .get_mut(handle)
            .ok_or(WorldError::StaleHandle(handle))?;
        if !matches!(body.motion, Motion::Orbital { .. }) {
            return Ok(());
        }

        body.track_velocity = enabled;
        body.state.velocity = enabled.then_some(DVec3::ZERO);
        Ok(())
    }

    /// Handles despawned since the last call.
    pub fn take_despawned(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.despawned)
    }

    /// Gravity sources for the physics toggle: every on-rails body.
    fn gravity_sources(&self, physics: &PhysicsSettings) -> Vec<GravitySource> {
        self.iter()
            .filter(|(_, body)| matches!(body.motion, Motion::Orbital { .. }))
            .map(|(_, body)| {
                (
                    body.state.position,
                    physics.gravity_constant * body.radius.powi(3),
                )
            })
            .collect()
    }

    /// Advance anomalies, spins and free bodies by one tick of `dt` seconds.
    ///
    /// A zero speed factor leaves every body untouched.
    pub fn advance(
        &mut self,
        speed: &SimulationSpeed,
        policy: TimeStepPolicy,
        physics: &PhysicsSettings,
        dt: f64,
    ) {
        let factor = speed.factor();
        if factor == 0.0 {
            return;
        }

        let rail_scale = factor * policy.step_scale(dt);
        let free_dt = factor * dt;
        let sources = if physics.gravity_enabled {
            self.gravity_sources(physics)
        } else {
            Vec::new()
        };

        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.state.frozen {
                continue;
            }

            body.state.rotation = wrap_angle(body.state.rotation + body.rotation_speed * rail_scale);

            match body.motion {
                Motion::Orbital { orbit, base_speed } => {
                    let anomaly = advance_anomaly(body.state.anomaly, base_speed * rail_scale);
                    let local = orbit.local_position(anomaly);
                    if local.is_finite() {
                        body.state.anomaly = anomaly;
                        body.state.local_position = local;
                    } else {
                        body.freeze("non-finite orbit position");
                    }
                }
                Motion::Free => {
                    let Some(velocity) = body.state.velocity else {
                        continue;
                    };
                    let (position, velocity) =
                        step_free_body(body.state.position, velocity, free_dt, &sources, physics);
                    if position.is_finite() && velocity.is_finite() {
                        body.state.position = position;
                        body.state.velocity = Some(velocity);
                    } else {
                        body.freeze("non-finite free-body state");
                    }
                }
            }
        }
    }

    /// Compose local offsets into world positions, top-down.
    ///
    /// On-rails bodies that track velocity get the finite difference of their
    /// composed world position over `dt`.
    pub fn compose(&mut self, dt: f64) {
        let mut previous = vec![None; self.slots.len()];

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(body) = &slot.body else {
                continue;
            };
            let local = match body.motion {
                Motion::Orbital { .. } => body.state.local_position,
                Motion::Free => body.state.position,
            };
            previous[index] = self.hierarchy.world(index).map(|w| w.position);
            self.hierarchy.set_local(index, local, body.state.rotation);
        }

        self.hierarchy.propagate();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            let Some(world) = self.hierarchy.world(index) else {
                continue;
            };

            body.state.position = world.position;
            if body.track_velocity
                && dt > 0.0
                && matches!(body.motion, Motion::Orbital { .. })
                && let Some(previous) = previous[index]
            {
                body.state.velocity = Some((world.position - previous) / dt);
            }
        }
    }

    /// Snapshot of every live body for collision detection.
    pub fn collision_bodies(&self) -> Vec<CollisionBody> {
        self.iter()
            .map(|(handle, body)| CollisionBody {
                handle,
                position: body.state.position,
                velocity: body.state.velocity,
                radius: body.radius,
                parent: body.parent,
            })
            .collect()
    }
}
