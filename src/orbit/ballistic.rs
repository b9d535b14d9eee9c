//! Free-body motion for transient bodies (comets, asteroids, debris).
//!
//! Free bodies carry their own velocity and move in real elapsed time. With
//! the physics toggle on they also fall toward every on-rails body, using the
//! same `radius³` mass proxy as collision response. On-rails bodies are never
//! perturbed.

use bevy::math::DVec3;
use bevy::prelude::Resource;

/// Settings for the physics toggle.
#[derive(Resource, Clone, Debug)]
pub struct PhysicsSettings {
    /// Whether free bodies feel gravity from on-rails bodies. Default: false.
    pub gravity_enabled: bool,
    /// Scene-unit gravitational constant applied to `radius³`. Default: 0.05.
    pub gravity_constant: f64,
    /// Plummer softening length in scene units. Default: 0.5.
    pub softening: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity_enabled: false,
            gravity_constant: 0.05,
            softening: 0.5,
        }
    }
}

/// A gravity source: position and GM (gravity constant × mass proxy).
pub type GravitySource = (DVec3, f64);

/// Softened inverse-square acceleration at `pos` from all sources.
#[inline]
pub fn gravity_acceleration(pos: DVec3, sources: &[GravitySource], softening: f64) -> DVec3 {
    let eps_sq = softening * softening;
    let mut acc = DVec3::ZERO;

    for &(body_pos, gm) in sources {
        let delta = body_pos - pos;
        let r_sq = delta.length_squared() + eps_sq;
        if r_sq > 0.0 {
            acc += delta * (gm / (r_sq * r_sq.sqrt()));
        }
    }

    acc
}

/// Advance one free body by `dt` (already multiplied by the speed factor).
///
/// Semi-implicit Euler: velocity first, then position with the new velocity.
pub fn step_free_body(
    position: DVec3,
    velocity: DVec3,
    dt: f64,
    sources: &[GravitySource],
    settings: &PhysicsSettings,
) -> (DVec3, DVec3) {
    let velocity = if settings.gravity_enabled && !sources.is_empty() {
        velocity + gravity_acceleration(position, sources, settings.softening) * dt
    } else {
        velocity
    };
    (position + velocity * dt, velocity)
}
