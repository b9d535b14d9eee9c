//! Impulse-based collision response.
//!
//! Mass is approximated by `radius³` (uniform density). The response is a
//! single restitution impulse along the contact normal followed by a
//! mass-weighted positional correction that pushes overlapping bodies apart.

use bevy::math::DVec3;

use super::detector::CollisionCandidate;
use super::{CollisionBody, CollisionEvent, CollisionSettings};
use crate::types::BodyHandle;
use crate::world::SimulationWorld;

/// Lower bound on the mass proxy so zero-radius bodies stay finite.
const MIN_MASS: f64 = 1e-12;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("body {0} no longer exists")]
    MissingBody(BodyHandle),

    #[error("body {0} has no tracked velocity")]
    MissingState(BodyHandle),
}

/// Mass proxy for a body of `radius`.
#[inline]
pub fn mass_proxy(radius: f64) -> f64 {
    radius.powi(3).max(MIN_MASS)
}

/// New velocities, position corrections and contact point for one pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactResponse {
    pub velocity_a: DVec3,
    pub velocity_b: DVec3,
    pub correction_a: DVec3,
    pub correction_b: DVec3,
    pub contact_point: DVec3,
}

/// Compute the response for `a` and `b` touching along `normal` (A → B).
///
/// No impulse is applied if the bodies are already separating.
pub fn compute_response(
    a: &CollisionBody,
    b: &CollisionBody,
    normal: DVec3,
    elasticity: f64,
) -> Result<ContactResponse, ResolveError> {
    let va = a.velocity.ok_or(ResolveError::MissingState(a.handle))?;
    let vb = b.velocity.ok_or(ResolveError::MissingState(b.handle))?;

    let ma = mass_proxy(a.radius);
    let mb = mass_proxy(b.radius);

    let v_n = (va - vb).dot(normal);
    let (velocity_a, velocity_b) = if v_n > 0.0 {
        let j = -(1.0 + elasticity) * v_n / (1.0 / ma + 1.0 / mb);
        (va + normal * (j / ma), vb - normal * (j / mb))
    } else {
        (va, vb)
    };

    let overlap = (a.radius + b.radius) - a.position.distance(b.position);
    let (correction_a, correction_b) = if overlap > 0.0 {
        let total = ma + mb;
        (
            -normal * (overlap * mb / total),
            normal * (overlap * ma / total),
        )
    } else {
        (DVec3::ZERO, DVec3::ZERO)
    };

    let pa = a.position + correction_a;
    let pb = b.position + correction_b;
    let radii = a.radius + b.radius;
    let contact_point = if radii > 0.0 {
        (pa * b.radius + pb * a.radius) / radii
    } else {
        (pa + pb) * 0.5
    };

    Ok(ContactResponse {
        velocity_a,
        velocity_b,
        correction_a,
        correction_b,
        contact_point,
    })
}

fn snapshot(world: &SimulationWorld, handle: BodyHandle) -> Result<CollisionBody, ResolveError> {
    let body = world.get(handle).ok_or(ResolveError::MissingBody(handle))?;
    Ok(CollisionBody {
        handle,
        position: body.state.position,
        velocity: body.state.velocity,
        radius: body.radius,
        parent: body.parent(),
    })
}

/// Apply the response for an accepted candidate and build its event.
///
/// On error nothing in the world is touched.
pub fn resolve(
    world: &mut SimulationWorld,
    candidate: &CollisionCandidate,
    settings: &CollisionSettings,
    now_ms: f64,
) -> Result<CollisionEvent, ResolveError> {
    let a = snapshot(world, candidate.body_a)?;
    let b = snapshot(world, candidate.body_b)?;
    let response = compute_response(&a, &b, candidate.contact_normal, settings.restitution())?;

    let (body_a, body_b) = world
        .pair_mut(candidate.body_a, candidate.body_b)
        .ok_or(ResolveError::MissingBody(candidate.body_b))?;
    body_a.state.position += response.correction_a;
    body_a.state.velocity = Some(response.velocity_a);
    body_b.state.position += response.correction_b;
    body_b.state.velocity = Some(response.velocity_b);

    Ok(CollisionEvent {
        body_a: candidate.body_a,
        body_b: candidate.body_b,
        contact_point: response.contact_point,
        contact_normal: candidate.contact_normal,
        impact_speed: candidate.impact_speed,
        debris_intensity: candidate.impact_speed * settings.debris_intensity_scale,
        timestamp_ms: now_ms,
    })
}
