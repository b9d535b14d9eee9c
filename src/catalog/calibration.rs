//! Kepler's Third Law speed calibration.
//!
//! For circular-ish orbits the angular speed scales as `a^(-3/2)`, so the
//! ratio of *linear* orbital speeds between two bodies is `√(a_ref / a)`.
//! The catalog ships with hand-tuned speeds; calibration replaces every
//! star-centred body's speed with the one implied by a reference body.

use bevy::log::info;

use super::{CatalogError, OrbitCatalog};

/// Speed ratio `v / v_ref` implied by Kepler's Third Law.
pub fn kepler_speed_ratio(reference_axis: f64, semi_major_axis: f64) -> f64 {
    (reference_axis / semi_major_axis).sqrt()
}

/// Recompute the base orbital speed of every star-centred body relative to
/// `reference`.
///
/// Skips the reference itself, bodies without a semi-major axis (the star),
/// and satellites, which orbit their parent rather than the star. Returns the
/// number of bodies whose speed was set.
///
/// Calibration is a one-time transform run before ticking starts. A second
/// call on the same catalog is a logged no-op until a new star-centred body
/// is inserted. The reference speed is never rewritten, so recalibrating
/// leaves already calibrated bodies unchanged.
pub fn calibrate_orbital_speeds(
    catalog: &mut OrbitCatalog,
    reference: &str,
) -> Result<usize, CatalogError> {
    if catalog.is_calibrated() {
        info!("Orbit catalog already calibrated, skipping");
        return Ok(0);
    }

    let reference_entry = catalog
        .get(reference)
        .ok_or_else(|| CatalogError::UnknownReference(reference.to_string()))?;
    let reference_axis = reference_entry
        .elements
        .semi_major_axis
        .ok_or_else(|| CatalogError::ReferenceWithoutAxis(reference.to_string()))?;
    let reference_speed = reference_entry.elements.base_orbital_speed;

    let mut calibrated = 0;
    for entry in catalog.entries_mut() {
        if entry.name == reference || entry.parent.is_some() {
            continue;
        }
        let Some(a) = entry.elements.semi_major_axis else {
            continue;
        };

        entry.elements.base_orbital_speed = reference_speed * kepler_speed_ratio(reference_axis, a);
        calibrated += 1;
    }

    catalog.mark_calibrated();
    info!(
        "Calibrated {} orbital speeds against {} (a = {}, v = {})",
        calibrated, reference, reference_axis, reference_speed
    );
    Ok(calibrated)
}
