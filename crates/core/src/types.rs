//! Geospatial value types shared by every HikePal component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Mean Earth radius used for great-circle distances, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic coordinate (WGS84 decimal degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate, rejecting values outside the valid ranges
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90, got {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180, got {}",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Shift the coordinate by the given deltas in degrees.
    ///
    /// Latitude saturates at the poles and longitude wraps across the
    /// antimeridian, so the result always satisfies the range invariant.
    pub fn offset(&self, delta_lat: f64, delta_lon: f64) -> Self {
        let latitude = (self.latitude + delta_lat).clamp(-90.0, 90.0);
        let mut longitude = self.longitude + delta_lon;
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude < -180.0 {
            longitude += 360.0;
        }
        Self {
            latitude,
            longitude,
        }
    }

    /// Calculate haversine distance to another coordinate in meters
    pub fn haversine_distance(&self, other: &Coordinate) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// `[latitude, longitude]` pair as used by the persisted track layout
    pub fn as_pair(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// A coordinate stamped with the moment it was last updated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Current coordinate
    pub coordinate: Coordinate,
    /// Time of the last simulator update
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Create a position stamped with the current time
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            updated_at: Utc::now(),
        }
    }
}

/// Teammate presence status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeammateStatus {
    /// Teammate is sharing position
    Active,
    /// Teammate has gone quiet
    Inactive,
}

/// A simulated member of the hiking party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teammate {
    /// Unique teammate identifier
    pub id: String,
    /// Name shown on the map and in chat
    pub display_name: String,
    /// Current coordinate
    pub position: Coordinate,
    /// Presence status
    pub status: TeammateStatus,
}

impl Teammate {
    /// Create an active teammate
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        position: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            position,
            status: TeammateStatus::Active,
        }
    }
}

/// What a waypoint marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    /// A photo was taken here
    Photo,
    /// A user-placed marker
    Marker,
}

impl WaypointKind {
    /// Note attached when the user does not supply one
    pub fn default_note(&self) -> &'static str {
        match self {
            WaypointKind::Photo => "Photo taken here",
            WaypointKind::Marker => "Marked location",
        }
    }

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            WaypointKind::Photo => "photo",
            WaypointKind::Marker => "marker",
        }
    }
}

/// A point of interest marked by the user while recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Unique, time-ordered identifier
    pub id: String,
    /// Where the waypoint was placed
    pub position: Coordinate,
    /// Photo or marker
    pub kind: WaypointKind,
    /// Optional free-text note
    pub note: Option<String>,
}
