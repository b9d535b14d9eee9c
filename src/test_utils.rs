//! Test utilities for orbit and collision tests.
//!
//! Provides body fixtures and assertions for physical invariants such as
//! momentum conservation across an impact.

use bevy::math::DVec3;

use crate::orbit::OrbitKind;
use crate::types::BodyClass;
use crate::world::BodySpec;

/// Fixtures for spawning test bodies.
pub mod fixtures {
    use super::*;

    /// Unit-radius planet on a flat ellipse around the origin.
    pub fn planet(name: &str, semi_major_axis: f64, eccentricity: f64, speed: f64) -> BodySpec {
        BodySpec::orbiting(
            name,
            BodyClass::Planet,
            OrbitKind::elliptical(semi_major_axis, eccentricity, 0.0),
            speed,
            1.0,
        )
    }

    /// Small moon on a circular orbit. Attach a parent with `with_parent`.
    pub fn moon(name: &str, distance: f64, speed: f64) -> BodySpec {
        BodySpec::orbiting(
            name,
            BodyClass::Moon,
            OrbitKind::circular(distance),
            speed,
            0.25,
        )
    }

    /// Comet with a tracked velocity.
    pub fn free_body(name: &str, position: DVec3, velocity: DVec3, radius: f64) -> BodySpec {
        BodySpec::free(name, BodyClass::Comet, position, velocity, radius)
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Linear momentum `m·v`.
    pub fn momentum(mass: f64, velocity: DVec3) -> DVec3 {
        velocity * mass
    }

    /// Kinetic energy `½·m·v²`.
    pub fn kinetic_energy(mass: f64, velocity: DVec3) -> f64 {
        0.5 * mass * velocity.length_squared()
    }

    /// Assert two momentum vectors agree within `tolerance` (absolute).
    ///
    /// # Panics
    /// Panics if the difference exceeds tolerance.
    pub fn assert_momentum_conserved(before: DVec3, after: DVec3, tolerance: f64) {
        let drift = (after - before).length();
        assert!(
            drift <= tolerance,
            "Momentum not conserved: before={before:?}, after={after:?}, drift={drift:.6e}, tolerance={tolerance:.6e}"
        );
    }
}

/// Utilities for creating headless Bevy apps for testing.
pub mod bevy_test {
    use bevy::prelude::*;

    use crate::SimulationPlugin;

    /// Minimal Bevy app with the simulation plugin and no rendering.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, SimulationPlugin));
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planet_fixture_is_elliptical() {
        let spec = fixtures::planet("Earth", 20.0, 0.0167, 0.01);
        assert_eq!(spec.class, BodyClass::Planet);
        assert_relative_eq!(spec.radius, 1.0);
    }

    #[test]
    fn test_kinetic_energy() {
        assert_relative_eq!(assertions::kinetic_energy(2.0, DVec3::new(3.0, 4.0, 0.0)), 25.0);
        assert_eq!(assertions::momentum(2.0, DVec3::X), DVec3::new(2.0, 0.0, 0.0));
    }
}
