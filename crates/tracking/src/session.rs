//! Session state machine
//!
//! `Idle → Recording → Finished → Idle`, with `save` and `discard` as the
//! two ways out of `Finished`. Every rejected transition leaves the state
//! and the recorder untouched.

use hikepal_core::{Coordinate, DistanceMethod, Track, Waypoint, WaypointKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{RecorderError, SessionError};
use crate::recorder::PathRecorder;

/// Lifecycle state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No recording
    Idle,
    /// Ticks are being recorded
    Recording,
    /// Stopped; the draft awaits save or discard
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// User-level session actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Start,
    Stop,
    Save,
    Discard,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionAction::Start => "start",
            SessionAction::Stop => "stop",
            SessionAction::Save => "save",
            SessionAction::Discard => "discard",
        };
        f.write_str(s)
    }
}

/// Owner of the recorder and the single active session
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    recorder: PathRecorder,
    generation: u64,
}

impl SessionController {
    pub fn new(distance_method: DistanceMethod) -> Self {
        Self {
            state: SessionState::Idle,
            recorder: PathRecorder::new(distance_method),
            generation: 0,
        }
    }

    fn check(&self, expected: SessionState, action: SessionAction) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    /// `Idle → Recording`, seeding the path with `seed`.
    ///
    /// Returns the new session generation. Clock ticks must carry this
    /// number; ticks from any earlier generation are dropped.
    pub fn start(&mut self, seed: Coordinate) -> Result<u64, SessionError> {
        self.check(SessionState::Idle, SessionAction::Start)?;

        self.generation += 1;
        self.recorder.start(seed);
        self.state = SessionState::Recording;

        info!(generation = self.generation, "Recording started");
        Ok(self.generation)
    }

    /// `Recording → Finished`; the recorder stops accepting ticks
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.check(SessionState::Recording, SessionAction::Stop)?;

        self.recorder.halt()?;
        self.state = SessionState::Finished;

        info!(
            generation = self.generation,
            points = self.recorder.path().len(),
            elapsed_seconds = self.recorder.elapsed_seconds(),
            "Recording stopped"
        );
        Ok(())
    }

    /// `Finished → Idle`, producing the named track
    pub fn save(&mut self, name: impl Into<String>) -> Result<Track, SessionError> {
        self.check(SessionState::Finished, SessionAction::Save)?;

        let track = self.recorder.finish(name)?;
        self.state = SessionState::Idle;

        info!(track_id = %track.id, summary = %track.summary(), "Track saved");
        Ok(track)
    }

    /// `Finished → Idle`, dropping the draft
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.check(SessionState::Finished, SessionAction::Discard)?;

        self.recorder.discard();
        self.state = SessionState::Idle;

        info!(generation = self.generation, "Recording discarded");
        Ok(())
    }

    /// Feed a freshly simulated user position; ignored unless recording.
    ///
    /// Returns the new path length when the position was recorded.
    pub fn on_position(&mut self, position: Coordinate) -> Option<usize> {
        if self.state != SessionState::Recording {
            return None;
        }
        match self.recorder.on_tick(position) {
            Ok(len) => Some(len),
            Err(e) => {
                warn!(error = %e, "Dropping position tick");
                None
            }
        }
    }

    /// One second of session clock for `generation`.
    ///
    /// Returns the new elapsed time, or `None` if the tick is stale or the
    /// session is not recording.
    pub fn on_second(&mut self, generation: u64) -> Option<u64> {
        if generation != self.generation || self.state != SessionState::Recording {
            debug!(
                tick_generation = generation,
                current_generation = self.generation,
                state = %self.state,
                "Ignoring stale clock tick"
            );
            return None;
        }
        self.recorder.on_second().ok()
    }

    /// Mark a waypoint; only legal while recording
    pub fn add_waypoint(
        &mut self,
        kind: WaypointKind,
        position: Coordinate,
        note: Option<String>,
    ) -> Result<Waypoint, RecorderError> {
        if self.state != SessionState::Recording {
            return Err(RecorderError::NotRecording);
        }
        let waypoint = self.recorder.add_waypoint(kind, position, note)?;
        debug!(waypoint_id = %waypoint.id, kind = waypoint.kind.as_str(), "Waypoint added");
        Ok(waypoint)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Generation of the most recently started session
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of the recorder
    pub fn recorder(&self) -> &PathRecorder {
        &self.recorder
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(DistanceMethod::default())
    }
}
