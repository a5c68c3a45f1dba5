//! External annotation source interface
//!
//! The source delivers two tables, `facilities` and `risk_zones`, whose rows
//! are mapped here into typed [`Annotation`]s. A snapshot maps completely or
//! not at all: one bad row rejects the whole response.

use hikepal_core::{Annotation, Coordinate, Facility, FacilityType, HazardType, HazardZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use crate::error::LoadError;

/// Row identifier; sources use either integer or text keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    /// Integer primary key
    Number(i64),
    /// Text primary key
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Number(n) => write!(f, "{}", n),
            RowId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Facility row as stored by the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRow {
    /// Source key
    pub id: RowId,
    /// `water_station`, `toilet`, `shelter`, or anything else
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name
    pub name: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// Hazard row as stored by the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRow {
    /// Source key
    pub id: RowId,
    /// Route the hazard belongs to
    #[serde(default)]
    pub route_id: Option<RowId>,
    /// Free-form hazard type
    #[serde(rename = "type")]
    pub kind: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Radius in meters
    pub radius: f64,
    /// Warning text
    pub message: String,
}

/// One complete response from the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// Facilities table
    #[serde(default)]
    pub facilities: Vec<FacilityRow>,
    /// Hazard table
    #[serde(default)]
    pub risk_zones: Vec<HazardRow>,
}

impl SourceSnapshot {
    /// Map every row into an annotation, facilities first.
    ///
    /// # Errors
    /// `SourceRejected` if any row carries an invalid coordinate or radius.
    pub fn into_annotations(self) -> Result<Vec<Annotation>, LoadError> {
        let mut annotations = Vec::with_capacity(self.facilities.len() + self.risk_zones.len());

        for row in self.facilities {
            let position = row_position(&row.id, row.latitude, row.longitude)?;
            annotations.push(Annotation::Facility(Facility {
                id: format!("fac-{}", row.id),
                position,
                facility_type: FacilityType::from_source(&row.kind),
                label: row.name,
            }));
        }

        for row in self.risk_zones {
            let position = row_position(&row.id, row.latitude, row.longitude)?;
            if !row.radius.is_finite() || row.radius < 0.0 || row.radius > f64::from(u32::MAX) {
                return Err(LoadError::SourceRejected(format!(
                    "risk zone {} has invalid radius {}",
                    row.id, row.radius
                )));
            }
            annotations.push(Annotation::Hazard(HazardZone {
                id: format!("risk-{}", row.id),
                route_id: row.route_id.map(|id| id.to_string()),
                position,
                hazard_type: HazardType::from_source(&row.kind),
                radius_meters: row.radius.round() as u32,
                message: row.message,
            }));
        }

        Ok(annotations)
    }
}

fn row_position(id: &RowId, latitude: f64, longitude: f64) -> Result<Coordinate, LoadError> {
    Coordinate::new(latitude, longitude)
        .map_err(|e| LoadError::SourceRejected(format!("row {}: {}", id, e)))
}

/// Something that can deliver facilities and hazard zones
pub trait AnnotationSource: Send + Sync {
    /// Fetch a full snapshot from the source
    fn fetch(&self) -> impl Future<Output = Result<SourceSnapshot, LoadError>> + Send;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Source backed by a JSON export of the two tables
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AnnotationSource for JsonFileSource {
    async fn fetch(&self) -> Result<SourceSnapshot, LoadError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LoadError::SourceUnreachable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| LoadError::SourceRejected(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// In-memory source returning a fixed outcome
#[derive(Debug, Clone)]
pub struct StaticSource {
    outcome: Result<SourceSnapshot, LoadError>,
}

impl StaticSource {
    /// Source that always returns `snapshot`
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            outcome: Ok(snapshot),
        }
    }

    /// Source that always fails with `error`
    pub fn failing(error: LoadError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl AnnotationSource for StaticSource {
    async fn fetch(&self) -> Result<SourceSnapshot, LoadError> {
        self.outcome.clone()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Placeholder used when no source has been configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSource;

impl AnnotationSource for UnconfiguredSource {
    async fn fetch(&self) -> Result<SourceSnapshot, LoadError> {
        Err(LoadError::SourceUnreachable(
            "annotation source not configured".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "unconfigured".to_string()
    }
}
