//! Core functionality for the HikePal companion.
//!
//! This crate provides the shared geospatial value types (coordinates,
//! teammates, waypoints, tracks, annotations), the persisted track layout,
//! and the logging/configuration utilities used across the workspace.

pub mod annotation;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod track;
pub mod types;

pub use annotation::{Annotation, Facility, FacilityType, HazardType, HazardZone};
pub use config::Config;
pub use error::{CoreError, Result};
pub use format::{format_distance_km, format_duration};
pub use track::{DistanceMethod, Track, TrackRecord, WaypointRecord};
pub use types::{
    Coordinate, Position, Teammate, TeammateStatus, Waypoint, WaypointKind, EARTH_RADIUS_M,
};
