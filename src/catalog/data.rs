//! Built-in solar system catalog in scene units.
//!
//! Eccentricities and inclinations are the real J2000 values; distances,
//! radii and speeds are compressed so everything fits one scene. Planet
//! orbital speeds are placeholders until [`super::calibrate_orbital_speeds`]
//! derives them from Earth's.

use super::{CatalogEntry, CatalogError, OrbitCatalog, OrbitalElements, RingSpec};
use crate::types::BodyClass;

/// Reference body for Kepler speed calibration.
pub const REFERENCE_BODY: &str = "Earth";

fn planet(name: &str, a: f64, e: f64, incl_deg: f64, radius: f64, spin: f64) -> CatalogEntry {
    CatalogEntry::new(
        name,
        BodyClass::Planet,
        OrbitalElements::elliptical(a, e, incl_deg, 0.01, radius).with_rotation(spin),
    )
}

fn moon(name: &str, parent: &str, distance: f64, speed: f64, radius: f64) -> CatalogEntry {
    CatalogEntry::new(
        name,
        BodyClass::Moon,
        OrbitalElements::circular(distance, speed, radius).with_rotation(speed),
    )
    .orbiting(parent)
}

/// Sun, the eight planets and their major moons.
pub fn solar_system() -> Result<OrbitCatalog, CatalogError> {
    OrbitCatalog::from_entries([
        CatalogEntry::new(
            "Sun",
            BodyClass::Star,
            OrbitalElements::stationary(5.0).with_rotation(0.001),
        ),
        // Planets (star-centred ellipses)
        planet("Mercury", 8.0, 0.2056, 7.00, 0.38, 0.004).starting_at(174.8),
        planet("Venus", 11.0, 0.0068, 3.39, 0.95, 0.002).starting_at(50.4),
        planet("Earth", 20.0, 0.0167, 0.0, 1.0, 0.02).starting_at(357.5),
        planet("Mars", 30.0, 0.0934, 1.85, 0.53, 0.018).starting_at(19.4),
        planet("Jupiter", 52.0, 0.0484, 1.30, 3.0, 0.04).starting_at(20.0),
        planet("Saturn", 95.0, 0.0542, 2.49, 2.5, 0.038)
            .starting_at(317.0)
            .with_ring(RingSpec::new("Saturn Rings", 26.7)),
        planet("Uranus", 190.0, 0.0472, 0.77, 1.8, 0.03)
            .starting_at(142.2)
            .with_ring(RingSpec::new("Uranus Rings", 97.8)),
        planet("Neptune", 300.0, 0.0086, 1.77, 1.7, 0.032).starting_at(256.2),
        // Moons (parent-relative circles)
        moon("Moon", "Earth", 2.5, 0.05, 0.27),
        moon("Phobos", "Mars", 1.2, 0.12, 0.05),
        moon("Deimos", "Mars", 1.8, 0.07, 0.04),
        moon("Io", "Jupiter", 4.5, 0.09, 0.29),
        moon("Europa", "Jupiter", 5.5, 0.07, 0.25),
        moon("Ganymede", "Jupiter", 7.0, 0.05, 0.41),
        moon("Callisto", "Jupiter", 9.0, 0.035, 0.38),
        moon("Enceladus", "Saturn", 4.0, 0.08, 0.06),
        moon("Titan", "Saturn", 6.0, 0.04, 0.4),
        moon("Triton", "Neptune", 3.5, 0.03, 0.21),
    ])
}
