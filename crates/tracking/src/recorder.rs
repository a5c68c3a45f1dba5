//! Path recorder
//!
//! Accumulates the user's path, waypoints and elapsed time for one
//! recording. A recording is *active* from `start` until `finish`/`discard`
//! and *halted* once the session stops: a halted recording keeps its draft
//! for saving but accepts no more ticks or waypoints.

use chrono::{DateTime, Utc};
use hikepal_core::{Coordinate, DistanceMethod, Track, Waypoint, WaypointKind};
use uuid::Uuid;

use crate::error::RecorderError;

#[derive(Debug, Clone)]
struct Recording {
    started_at: DateTime<Utc>,
    path: Vec<Coordinate>,
    waypoints: Vec<Waypoint>,
    elapsed_seconds: u64,
    halted: bool,
}

/// Recorder for a single session's path and waypoints
#[derive(Debug, Clone)]
pub struct PathRecorder {
    recording: Option<Recording>,
    distance_method: DistanceMethod,
}

impl PathRecorder {
    /// Create an idle recorder that will report distances with `distance_method`
    pub fn new(distance_method: DistanceMethod) -> Self {
        Self {
            recording: None,
            distance_method,
        }
    }

    /// Begin a recording seeded with `seed`.
    ///
    /// Any previous draft is dropped; guarding against that is the session
    /// controller's job.
    pub fn start(&mut self, seed: Coordinate) {
        self.recording = Some(Recording {
            started_at: Utc::now(),
            path: vec![seed],
            waypoints: Vec::new(),
            elapsed_seconds: 0,
            halted: false,
        });
    }

    fn live(&mut self) -> Result<&mut Recording, RecorderError> {
        match self.recording.as_mut() {
            Some(rec) if !rec.halted => Ok(rec),
            _ => Err(RecorderError::NotRecording),
        }
    }

    /// Append the position produced by a simulator tick; returns the new path length
    pub fn on_tick(&mut self, position: Coordinate) -> Result<usize, RecorderError> {
        let rec = self.live()?;
        rec.path.push(position);
        Ok(rec.path.len())
    }

    /// Advance the recording clock by one second; returns the new elapsed time
    pub fn on_second(&mut self) -> Result<u64, RecorderError> {
        let rec = self.live()?;
        rec.elapsed_seconds += 1;
        Ok(rec.elapsed_seconds)
    }

    /// Mark a waypoint at `position`.
    ///
    /// Ids are `wp-<start millis>-<sequence>`, which sort in creation order.
    /// Without a note, the kind's default note is attached.
    pub fn add_waypoint(
        &mut self,
        kind: WaypointKind,
        position: Coordinate,
        note: Option<String>,
    ) -> Result<Waypoint, RecorderError> {
        let rec = self.live()?;
        let waypoint = Waypoint {
            id: format!(
                "wp-{}-{:06}",
                rec.started_at.timestamp_millis(),
                rec.waypoints.len() + 1
            ),
            position,
            kind,
            note: Some(note.unwrap_or_else(|| kind.default_note().to_string())),
        };
        rec.waypoints.push(waypoint.clone());
        Ok(waypoint)
    }

    /// Freeze the draft: no more ticks, seconds or waypoints
    pub fn halt(&mut self) -> Result<(), RecorderError> {
        self.live()?.halted = true;
        Ok(())
    }

    /// Produce the immutable track and clear the recorder
    pub fn finish(&mut self, name: impl Into<String>) -> Result<Track, RecorderError> {
        let rec = self.recording.take().ok_or(RecorderError::NotRecording)?;
        let distance_meters = self.distance_method.measure(&rec.path);

        Ok(Track {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            started_at: rec.started_at,
            ended_at: Utc::now(),
            path: rec.path,
            waypoints: rec.waypoints,
            duration_seconds: rec.elapsed_seconds,
            distance_meters,
            distance_method: self.distance_method,
        })
    }

    /// Drop the draft without producing a track; returns whether one existed
    pub fn discard(&mut self) -> bool {
        self.recording.take().is_some()
    }

    /// Whether ticks are currently accepted
    pub fn is_recording(&self) -> bool {
        matches!(&self.recording, Some(rec) if !rec.halted)
    }

    /// Whether a draft (live or halted) exists
    pub fn has_draft(&self) -> bool {
        self.recording.is_some()
    }

    /// Recorded path, empty when idle
    pub fn path(&self) -> &[Coordinate] {
        self.recording.as_ref().map_or(&[], |rec| rec.path.as_slice())
    }

    /// Waypoints in creation order, empty when idle
    pub fn waypoints(&self) -> &[Waypoint] {
        self.recording
            .as_ref()
            .map_or(&[], |rec| rec.waypoints.as_slice())
    }

    /// Recording clock in seconds
    pub fn elapsed_seconds(&self) -> u64 {
        self.recording.as_ref().map_or(0, |rec| rec.elapsed_seconds)
    }

    /// Distance according to the configured method
    pub fn distance_meters(&self) -> f64 {
        self.distance_method.measure(self.path())
    }

    /// Legacy path-length proxy (`points × 5 m`), regardless of configuration
    pub fn approximate_distance_meters(&self) -> f64 {
        DistanceMethod::Approximate.measure(self.path())
    }

    /// Great-circle distance along the path, regardless of configuration
    pub fn haversine_distance_meters(&self) -> f64 {
        DistanceMethod::Haversine.measure(self.path())
    }

    /// Configured distance method
    pub fn distance_method(&self) -> DistanceMethod {
        self.distance_method
    }
}

impl Default for PathRecorder {
    fn default() -> Self {
        Self::new(DistanceMethod::default())
    }
}
