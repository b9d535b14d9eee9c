//! Orbit catalog: static per-body orbital elements.
//!
//! The catalog is filled once by a loading collaborator and validated entry by
//! entry on insertion, so an invalid element is rejected before the simulation
//! ever starts. Entries keep insertion order; a satellite must be inserted
//! after its parent.

pub mod calibration;
pub mod data;

pub use calibration::{calibrate_orbital_speeds, kepler_speed_ratio};
pub use data::{REFERENCE_BODY, solar_system};

use bevy::log::warn;

use crate::orbit::OrbitKind;
use crate::types::{BodyClass, MAX_ECCENTRICITY};

/// Configuration errors found while loading or calibrating the catalog.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("body `{name}`: semi-major axis {value} must be positive and finite")]
    InvalidSemiMajorAxis { name: String, value: f64 },

    #[error("body `{name}`: orbit distance {value} must be positive and finite")]
    InvalidDistance { name: String, value: f64 },

    #[error("body `{name}`: eccentricity {value} outside [0, 1)")]
    InvalidEccentricity { name: String, value: f64 },

    #[error("body `{name}`: radius {value} must be non-negative and finite")]
    InvalidRadius { name: String, value: f64 },

    #[error("body `{name}`: {field} is not finite ({value})")]
    NonFinite {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("body `{0}`: eccentric orbit has no semi-major axis")]
    MissingSemiMajorAxis(String),

    #[error("body `{name}` references unknown parent `{parent}`")]
    UnknownParent { name: String, parent: String },

    #[error("duplicate body name `{0}`")]
    DuplicateName(String),

    #[error("unknown calibration reference `{0}`")]
    UnknownReference(String),

    #[error("calibration reference `{0}` has no semi-major axis")]
    ReferenceWithoutAxis(String),
}

/// Raw orbital elements as supplied by the loading collaborator.
///
/// Either `semi_major_axis` (star-centred orbits) or `distance`
/// (parent-relative circular orbits) sizes the orbit. Neither means the body
/// does not move.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis in scene units
    pub semi_major_axis: Option<f64>,
    /// Radius of a circular orbit in scene units
    pub distance: Option<f64>,
    /// Eccentricity; unset means circular
    pub eccentricity: Option<f64>,
    /// Inclination of the orbital plane in degrees
    pub inclination_deg: f64,
    /// Anomaly advance in radians per tick at speed factor 1
    pub base_orbital_speed: f64,
    /// Spin advance in radians per tick at speed factor 1
    pub rotation_speed: f64,
    /// Body radius in scene units
    pub radius: f64,
}

impl OrbitalElements {
    /// Elements for a body fixed at its parent's origin.
    pub fn stationary(radius: f64) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    /// Elements for a circular, parent-relative orbit.
    pub fn circular(distance: f64, base_orbital_speed: f64, radius: f64) -> Self {
        Self {
            distance: Some(distance),
            base_orbital_speed,
            radius,
            ..Default::default()
        }
    }

    /// Elements for a focus-centred elliptical orbit.
    pub fn elliptical(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination_deg: f64,
        base_orbital_speed: f64,
        radius: f64,
    ) -> Self {
        Self {
            semi_major_axis: Some(semi_major_axis),
            eccentricity: Some(eccentricity),
            inclination_deg,
            base_orbital_speed,
            radius,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation_speed: f64) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    /// Validate the elements and resolve them into an [`OrbitKind`].
    ///
    /// Eccentricities in `(0.999, 1)` are clamped rather than rejected;
    /// anything at or beyond 1 is an error.
    pub fn orbit_kind(&self, name: &str) -> Result<OrbitKind, CatalogError> {
        for (field, value) in [
            ("inclination", self.inclination_deg),
            ("orbital speed", self.base_orbital_speed),
            ("rotation speed", self.rotation_speed),
        ] {
            if !value.is_finite() {
                return Err(CatalogError::NonFinite {
                    name: name.to_string(),
                    field,
                    value,
                });
            }
        }

        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(CatalogError::InvalidRadius {
                name: name.to_string(),
                value: self.radius,
            });
        }

        let mut eccentricity = self.eccentricity.unwrap_or(0.0);
        if !eccentricity.is_finite() || !(0.0..1.0).contains(&eccentricity) {
            return Err(CatalogError::InvalidEccentricity {
                name: name.to_string(),
                value: eccentricity,
            });
        }
        if eccentricity > MAX_ECCENTRICITY {
            warn!(
                "Clamping eccentricity of `{}` from {} to {}",
                name, eccentricity, MAX_ECCENTRICITY
            );
            eccentricity = MAX_ECCENTRICITY;
        }

        match (self.semi_major_axis, self.distance) {
            (Some(a), _) => {
                if !a.is_finite() || a <= 0.0 {
                    return Err(CatalogError::InvalidSemiMajorAxis {
                        name: name.to_string(),
                        value: a,
                    });
                }
                if eccentricity == 0.0 {
                    Ok(OrbitKind::circular(a))
                } else {
                    Ok(OrbitKind::elliptical(a, eccentricity, self.inclination_deg))
                }
            }
            (None, Some(distance)) => {
                if !distance.is_finite() || distance <= 0.0 {
                    return Err(CatalogError::InvalidDistance {
                        name: name.to_string(),
                        value: distance,
                    });
                }
                if eccentricity > 0.0 {
                    return Err(CatalogError::MissingSemiMajorAxis(name.to_string()));
                }
                Ok(OrbitKind::circular(distance))
            }
            (None, None) if eccentricity > 0.0 => {
                Err(CatalogError::MissingSemiMajorAxis(name.to_string()))
            }
            (None, None) => Ok(OrbitKind::Stationary),
        }
    }
}

/// Decorative ring attached to a body (e.g. Saturn's rings).
#[derive(Clone, Debug, PartialEq)]
pub struct RingSpec {
    pub name: String,
    /// Tilt of the ring plane in degrees, applied by the renderer
    pub tilt_deg: f64,
}

impl RingSpec {
    pub fn new(name: impl Into<String>, tilt_deg: f64) -> Self {
        Self {
            name: name.into(),
            tilt_deg,
        }
    }
}

/// A single catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    /// Unique display name, also the lookup key
    pub name: String,
    pub class: BodyClass,
    /// Name of the parent body, if this is a satellite
    pub parent: Option<String>,
    /// Orbit shape and rates, validated on insert
    pub elements: OrbitalElements,
    /// Starting anomaly in degrees
    pub initial_anomaly_deg: f64,
    /// Decorative rings, in draw order
    pub rings: Vec<RingSpec>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, class: BodyClass, elements: OrbitalElements) -> Self {
        Self {
            name: name.into(),
            class,
            parent: None,
            elements,
            initial_anomaly_deg: 0.0,
            rings: Vec::new(),
        }
    }

    /// Make this entry a satellite of `parent`.
    pub fn orbiting(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the starting anomaly, in degrees.
    pub fn starting_at(mut self, anomaly_deg: f64) -> Self {
        self.initial_anomaly_deg = anomaly_deg;
        self
    }

    pub fn with_ring(mut self, ring: RingSpec) -> Self {
        self.rings.push(ring);
        self
    }
}

/// Ordered, validated collection of catalog entries.
#[derive(Clone, Debug, Default)]
pub struct OrbitCatalog {
    entries: Vec<CatalogEntry>,
    calibrated: bool,
}

impl OrbitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an entry.
    ///
    /// The parent, if any, must already be in the catalog. A new star-centred
    /// body with a semi-major axis clears the calibrated flag so the next
    /// calibration covers it.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        if self.get(&entry.name).is_some() {
            return Err(CatalogError::DuplicateName(entry.name));
        }
        if let Some(parent) = &entry.parent
            && self.get(parent).is_none()
        {
            return Err(CatalogError::UnknownParent {
                name: entry.name.clone(),
                parent: parent.clone(),
            });
        }
        if !entry.initial_anomaly_deg.is_finite() {
            return Err(CatalogError::NonFinite {
                name: entry.name.clone(),
                field: "initial anomaly",
                value: entry.initial_anomaly_deg,
            });
        }

        entry.elements.orbit_kind(&entry.name)?;
        if entry.parent.is_none() && entry.elements.semi_major_axis.is_some() {
            self.calibrated = false;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Build a catalog from entries in dependency order.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [CatalogEntry] {
        &mut self.entries
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Direct satellites of `name`, in catalog order.
    pub fn satellites_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.parent.as_deref() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether Kepler speed calibration has already been applied.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub(crate) fn mark_calibrated(&mut self) {
        self.calibrated = true;
    }
}
