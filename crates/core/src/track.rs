//! Completed tracks and their persisted layout

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::format::{format_distance_km, format_duration};
use crate::types::{Coordinate, Waypoint, WaypointKind};

/// Meters credited per recorded path point by [`DistanceMethod::Approximate`]
pub const APPROX_METERS_PER_POINT: f64 = 5.0;

/// How a track's distance was computed.
///
/// The two methods produce different numbers for the same path, so the
/// method travels with every track and its persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMethod {
    /// Path length proxy: `points × 5 m`. Not a real distance; kept so
    /// summaries produced by earlier releases stay reproducible.
    #[default]
    #[serde(rename = "approximate-v1")]
    Approximate,
    /// Sum of great-circle distances between consecutive points
    #[serde(rename = "haversine-v1")]
    Haversine,
}

impl DistanceMethod {
    /// Distance in meters covered by `path`
    pub fn measure(&self, path: &[Coordinate]) -> f64 {
        match self {
            DistanceMethod::Approximate => path.len() as f64 * APPROX_METERS_PER_POINT,
            DistanceMethod::Haversine => path
                .windows(2)
                .map(|pair| pair[0].haversine_distance(&pair[1]))
                .sum(),
        }
    }

    /// Versioned method name
    pub fn version(&self) -> &'static str {
        match self {
            DistanceMethod::Approximate => "approximate-v1",
            DistanceMethod::Haversine => "haversine-v1",
        }
    }
}

/// An immutable recorded hike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track identifier
    pub id: String,
    /// Display name chosen at save time
    pub name: String,
    /// When recording started
    pub started_at: DateTime<Utc>,
    /// When the track was finalized
    pub ended_at: DateTime<Utc>,
    /// Recorded positions in temporal order
    pub path: Vec<Coordinate>,
    /// Waypoints in creation order
    pub waypoints: Vec<Waypoint>,
    /// Recording clock at stop time
    pub duration_seconds: u64,
    /// Distance according to `distance_method`
    pub distance_meters: f64,
    /// Method used for `distance_meters`
    pub distance_method: DistanceMethod,
}

impl Track {
    /// One-line summary, e.g. `Evening Hike · 00:42:10 · 1.25 km`
    pub fn summary(&self) -> String {
        format!(
            "{} · {} · {}",
            self.name,
            format_duration(self.duration_seconds),
            format_distance_km(self.distance_meters)
        )
    }
}

/// Persisted waypoint layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: WaypointKind,
    pub note: Option<String>,
}

/// Persisted track layout handed to history/library storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    /// Moment the track was saved (ISO8601)
    pub date: DateTime<Utc>,
    pub duration_seconds: u64,
    pub distance_meters: f64,
    #[serde(default)]
    pub distance_method: DistanceMethod,
    /// `[latitude, longitude]` pairs in temporal order
    pub path: Vec<[f64; 2]>,
    pub waypoints: Vec<WaypointRecord>,
}

impl From<&Track> for TrackRecord {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            date: track.ended_at,
            duration_seconds: track.duration_seconds,
            distance_meters: track.distance_meters,
            distance_method: track.distance_method,
            path: track.path.iter().map(Coordinate::as_pair).collect(),
            waypoints: track
                .waypoints
                .iter()
                .map(|wp| WaypointRecord {
                    id: wp.id.clone(),
                    latitude: wp.position.latitude,
                    longitude: wp.position.longitude,
                    kind: wp.kind,
                    note: wp.note.clone(),
                })
                .collect(),
        }
    }
}

impl TrackRecord {
    /// Rebuild a [`Track`], validating every stored coordinate.
    ///
    /// The record keeps no start time; it is reconstructed as
    /// `date - durationSeconds`.
    pub fn into_track(self) -> Result<Track> {
        let path = self
            .path
            .iter()
            .map(|[lat, lon]| Coordinate::new(*lat, *lon))
            .collect::<Result<Vec<_>>>()?;
        let waypoints = self
            .waypoints
            .into_iter()
            .map(|wp| {
                Ok(Waypoint {
                    position: Coordinate::new(wp.latitude, wp.longitude)?,
                    id: wp.id,
                    kind: wp.kind,
                    note: wp.note,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let started_at = i64::try_from(self.duration_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|duration| self.date.checked_sub_signed(duration))
            .ok_or_else(|| {
                CoreError::InvalidRecord(format!(
                    "duration of {}s is out of range",
                    self.duration_seconds
                ))
            })?;

        Ok(Track {
            id: self.id,
            name: self.name,
            started_at,
            ended_at: self.date,
            path,
            waypoints,
            duration_seconds: self.duration_seconds,
            distance_meters: self.distance_meters,
            distance_method: self.distance_method,
        })
    }
}
