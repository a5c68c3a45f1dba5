//! Map annotations: facilities and hazard zones
//!
//! Annotations arrive from an external source with free-form `type` strings.
//! Mapping into these variants is permissive: unknown facility types become
//! [`FacilityType::Marker`] and unknown hazard types become
//! [`HazardType::Other`] carrying the raw value.

use serde::{Deserialize, Serialize};

use crate::types::Coordinate;

/// Facility category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    /// Water station
    Water,
    /// Public toilet
    Toilet,
    /// Shelter or pavilion
    Shelter,
    /// Fallback for unrecognized source types
    Marker,
}

impl FacilityType {
    /// Map a source `type` string onto a facility category
    pub fn from_source(raw: &str) -> Self {
        match raw.trim() {
            "water_station" => FacilityType::Water,
            "toilet" => FacilityType::Toilet,
            "shelter" => FacilityType::Shelter,
            _ => FacilityType::Marker,
        }
    }
}

/// Hazard category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    /// Landslide risk
    Landslide,
    /// No mobile signal
    NoSignal,
    /// Cliff edge
    Cliff,
    /// Anything else; keeps the raw source value for display
    Other(String),
}

impl HazardType {
    /// Map a source `type` string onto a hazard category
    pub fn from_source(raw: &str) -> Self {
        match raw.trim() {
            "landslide" => HazardType::Landslide,
            "no_signal" => HazardType::NoSignal,
            "cliff" => HazardType::Cliff,
            other => HazardType::Other(other.to_string()),
        }
    }

    /// Display label
    pub fn label(&self) -> &str {
        match self {
            HazardType::Landslide => "landslide",
            HazardType::NoSignal => "no_signal",
            HazardType::Cliff => "cliff",
            HazardType::Other(raw) => raw,
        }
    }
}

/// A trail facility (water, toilet, shelter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Namespaced identifier (`fac-<source id>`)
    pub id: String,
    /// Location
    pub position: Coordinate,
    /// Category
    pub facility_type: FacilityType,
    /// Display name
    pub label: String,
}

/// A circular hazard area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    /// Namespaced identifier (`risk-<source id>`)
    pub id: String,
    /// Route the hazard was filed against, if any
    pub route_id: Option<String>,
    /// Center of the zone
    pub position: Coordinate,
    /// Category
    pub hazard_type: HazardType,
    /// Radius in meters
    pub radius_meters: u32,
    /// Warning shown to hikers
    pub message: String,
}

impl HazardZone {
    /// Whether `point` lies inside the zone's radius
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.position.haversine_distance(point) <= f64::from(self.radius_meters)
    }
}

/// Map annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Annotation {
    /// Trail facility
    Facility(Facility),
    /// Hazard zone
    Hazard(HazardZone),
}

impl Annotation {
    /// Annotation identifier
    pub fn id(&self) -> &str {
        match self {
            Annotation::Facility(f) => &f.id,
            Annotation::Hazard(h) => &h.id,
        }
    }

    /// Annotation location
    pub fn position(&self) -> Coordinate {
        match self {
            Annotation::Facility(f) => f.position,
            Annotation::Hazard(h) => h.position,
        }
    }

    /// Text shown in the annotation popup
    pub fn label(&self) -> &str {
        match self {
            Annotation::Facility(f) => &f.label,
            Annotation::Hazard(h) => &h.message,
        }
    }
}
