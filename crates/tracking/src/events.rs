//! Observer interface: events broadcast by the runtime and the read-only
//! snapshot handed to projections.

use hikepal_annotations::{AnnotationSet, LoadError};
use hikepal_core::{Coordinate, DistanceMethod, Position, Teammate, Waypoint};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::safety::SafetyAlert;
use crate::session::SessionState;
use crate::telemetry::TelemetryReading;

/// Session lifecycle step that just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTransition {
    Started,
    Stopped,
    Saved,
    Discarded,
}

/// Counts from a successful annotation load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub facilities: usize,
    pub hazards: usize,
}

impl LoadReport {
    pub fn from_set(set: &AnnotationSet) -> Self {
        Self {
            facilities: set.facility_count(),
            hazards: set.hazard_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// One-time, human-readable message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    /// Notice describing the outcome of an annotation load
    pub fn for_load(outcome: &Result<LoadReport, LoadError>) -> Self {
        match outcome {
            Ok(report) if report.facilities == 0 && report.hazards == 0 => {
                Notice::info("Connected, but no facilities or risk zones were found")
            }
            Ok(report) => Notice::info(format!(
                "Synced {} facilities and {} risk zones",
                report.facilities, report.hazards
            )),
            Err(LoadError::SourceUnreachable(reason)) => Notice::warning(format!(
                "Map data unavailable ({}); showing the last known points",
                reason
            )),
            Err(LoadError::SourceRejected(reason)) => Notice::warning(format!(
                "Map data could not be read ({}); showing the last known points",
                reason
            )),
        }
    }
}

/// Everything a subscriber can be told about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompanionEvent {
    UserMoved { tick: u64, coordinate: Coordinate },
    TeammatesMoved { tick: u64, teammates: Vec<Teammate> },
    PathExtended { points: usize },
    ElapsedTick { elapsed_seconds: u64 },
    SessionChanged {
        transition: SessionTransition,
        state: SessionState,
    },
    AlertRaised { alert: SafetyAlert },
    AlertCleared { acknowledged: bool },
    AnnotationsReplaced { report: LoadReport },
    Notice { notice: Notice },
}

/// Read-only view of the recording session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub generation: u64,
    pub path: Vec<Coordinate>,
    pub waypoints: Vec<Waypoint>,
    pub elapsed_seconds: u64,
    pub distance_meters: f64,
    pub distance_method: DistanceMethod,
}

/// Owned copy of the engine state at one instant
#[derive(Debug, Clone)]
pub struct CompanionSnapshot {
    pub user: Position,
    pub teammates: Vec<Teammate>,
    pub session: SessionView,
    pub alert: Option<SafetyAlert>,
    pub annotations: Arc<AnnotationSet>,
    pub telemetry: Option<TelemetryReading>,
    pub emergency_number: String,
}
