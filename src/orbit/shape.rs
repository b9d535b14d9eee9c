//! Orbit geometry: anomaly angle to parent-relative Cartesian position.
//!
//! Ellipses are parameterized along their major axis with the parent body at
//! a focus, not at the ellipse centre:
//!
//! ```text
//! x = a·cos θ − c
//! z = b·sin θ          (in the orbital plane)
//! ```
//!
//! The orbital plane is then tilted about the major (X) axis by the
//! inclination, which moves part of the in-plane `z` into `y`.

use bevy::math::DVec3;
use std::f64::consts::TAU;

use crate::types::DEG_TO_RAD;

/// Ellipse with derived axes, built from validated elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    /// Semi-major axis `a`
    pub semi_major_axis: f64,
    /// Semi-minor axis `b = a·√(1−e²)`
    pub semi_minor_axis: f64,
    /// Focal distance `c = a·e`
    pub focal_distance: f64,
    /// Eccentricity (0 ≤ e < 1)
    pub eccentricity: f64,
    /// Inclination of the orbital plane in radians
    pub inclination: f64,
}

impl Ellipse {
    /// Derive `b` and `c` from `a`, `e` and an inclination in degrees.
    ///
    /// Callers are expected to pass elements that already passed catalog
    /// validation (`a > 0`, `0 ≤ e < 1`).
    pub fn new(semi_major_axis: f64, eccentricity: f64, inclination_deg: f64) -> Self {
        Self {
            semi_major_axis,
            semi_minor_axis: semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt(),
            focal_distance: semi_major_axis * eccentricity,
            eccentricity,
            inclination: inclination_deg * DEG_TO_RAD,
        }
    }

    /// Position relative to the focus (the parent body) at anomaly `theta`.
    pub fn local_position(&self, theta: f64) -> DVec3 {
        let x = self.semi_major_axis * theta.cos() - self.focal_distance;
        let z_plane = self.semi_minor_axis * theta.sin();

        if self.inclination != 0.0 {
            DVec3::new(
                x,
                z_plane * self.inclination.sin(),
                z_plane * self.inclination.cos(),
            )
        } else {
            DVec3::new(x, 0.0, z_plane)
        }
    }

    /// Closest distance to the focus.
    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis - self.focal_distance
    }

    /// Farthest distance from the focus.
    pub fn apoapsis(&self) -> f64 {
        self.semi_major_axis + self.focal_distance
    }
}

/// Shape of a body's path around its parent (or the origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitKind {
    /// Does not orbit anything (the star)
    Stationary,
    /// Circle of fixed radius in the XZ plane
    Circular { distance: f64 },
    /// Focus-centred, optionally inclined ellipse
    Elliptical(Ellipse),
}

impl OrbitKind {
    pub fn circular(distance: f64) -> Self {
        OrbitKind::Circular { distance }
    }

    pub fn elliptical(semi_major_axis: f64, eccentricity: f64, inclination_deg: f64) -> Self {
        OrbitKind::Elliptical(Ellipse::new(semi_major_axis, eccentricity, inclination_deg))
    }

    /// Parent-relative position at anomaly `theta`.
    pub fn local_position(&self, theta: f64) -> DVec3 {
        match self {
            OrbitKind::Stationary => DVec3::ZERO,
            OrbitKind::Circular { distance } => {
                DVec3::new(distance * theta.cos(), 0.0, distance * theta.sin())
            }
            OrbitKind::Elliptical(ellipse) => ellipse.local_position(theta),
        }
    }

    /// Semi-major axis, or the radius for circular orbits.
    pub fn semi_major_axis(&self) -> Option<f64> {
        match self {
            OrbitKind::Stationary => None,
            OrbitKind::Circular { distance } => Some(*distance),
            OrbitKind::Elliptical(ellipse) => Some(ellipse.semi_major_axis),
        }
    }

    /// Sample a closed polyline of the orbit for orbit-line drawing.
    ///
    /// Returns `segments + 1` points, the last equal to the first.
    /// Stationary bodies have no path.
    pub fn sample_path(&self, segments: usize) -> Vec<DVec3> {
        if matches!(self, OrbitKind::Stationary) || segments == 0 {
            return Vec::new();
        }

        (0..=segments)
            .map(|i| {
                let theta = if i == segments {
                    0.0
                } else {
                    TAU * i as f64 / segments as f64
                };
                self.local_position(theta)
            })
            .collect()
    }
}
