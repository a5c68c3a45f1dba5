//! Async runtime driving the engine
//!
//! Two independent periodic tasks share the tick period:
//! - the position loop, alive for the whole runtime, ticks the simulator
//!   and feeds the recorder while recording;
//! - the session clock, spawned per recording and aborted on stop, counts
//!   elapsed seconds.
//!
//! State lives behind `tokio::sync::Mutex`es that are always taken in the
//! order simulator → session → safety.

use hikepal_annotations::{AnnotationSet, AnnotationSource, AnnotationStore, LoadError};
use hikepal_core::{Config, Coordinate, Track, Waypoint, WaypointKind};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::collaborators::{
    ChatLog, MemoryLibrary, MessageKind, MessageSink, OutboundMessage, SENDER_NAME, TrackLibrary,
};
use crate::error::CompanionError;
use crate::events::{
    CompanionEvent, CompanionSnapshot, LoadReport, Notice, SessionTransition, SessionView,
};
use crate::safety::{SafetyAlert, SafetyController};
use crate::session::SessionController;
use crate::simulator::PositionSimulator;
use crate::telemetry::{SimulatedTelemetry, TelemetryReading, TelemetrySource};

const EVENT_CAPACITY: usize = 256;

/// External collaborators the runtime calls into
#[derive(Clone)]
pub struct Collaborators {
    pub telemetry: Arc<dyn TelemetrySource>,
    pub chat: Arc<dyn MessageSink>,
    pub library: Arc<dyn TrackLibrary>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            telemetry: Arc::new(SimulatedTelemetry::new()),
            chat: Arc::new(ChatLog::new()),
            library: Arc::new(MemoryLibrary::new()),
        }
    }
}

struct SessionSlot {
    controller: SessionController,
    /// Clock task of the current recording; replaced only under this lock
    clock: Option<JoinHandle<()>>,
}

struct Shared {
    simulator: Mutex<PositionSimulator>,
    session: Mutex<SessionSlot>,
    safety: Mutex<SafetyController>,
    annotations: AnnotationStore,
    collaborators: Collaborators,
    events: broadcast::Sender<CompanionEvent>,
    tick_period: Duration,
    fetch_timeout: Duration,
    default_track_name: String,
}

impl Shared {
    fn emit(&self, event: CompanionEvent) {
        if self.events.send(event).is_err() {
            trace!("No event subscribers");
        }
    }

    fn altitude(&self) -> Option<i32> {
        self.collaborators.telemetry.read().map(|r| r.altitude_meters)
    }

    async fn position_tick(&self) {
        let mut simulator = self.simulator.lock().await;
        let mut slot = self.session.lock().await;

        let outcome = simulator.tick(slot.controller.is_recording());
        let points = outcome
            .user
            .and_then(|coordinate| slot.controller.on_position(coordinate));
        let teammates = simulator.teammates();
        drop(slot);
        drop(simulator);

        if let Some(coordinate) = outcome.user {
            self.emit(CompanionEvent::UserMoved {
                tick: outcome.tick,
                coordinate,
            });
        }
        if let Some(points) = points {
            self.emit(CompanionEvent::PathExtended { points });
        }
        self.emit(CompanionEvent::TeammatesMoved {
            tick: outcome.tick,
            teammates,
        });
    }

    /// Returns `false` once the clock's session is over
    async fn clock_tick(&self, generation: u64) -> bool {
        let elapsed = self.session.lock().await.controller.on_second(generation);
        match elapsed {
            Some(elapsed_seconds) => {
                self.collaborators.telemetry.on_recording_second();
                self.emit(CompanionEvent::ElapsedTick { elapsed_seconds });
                true
            }
            None => false,
        }
    }
}

async fn run_position_loop(shared: Weak<Shared>, first: Instant, period: Duration) {
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.position_tick().await;
    }
    debug!("Position loop stopped");
}

async fn run_session_clock(
    shared: Weak<Shared>,
    generation: u64,
    first: Instant,
    period: Duration,
) {
    let mut ticker = interval_at(first, period);
    // Elapsed time must not lose seconds under scheduling jitter
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.clock_tick(generation).await {
            break;
        }
    }
    debug!(generation, "Session clock stopped");
}

/// Handle to a running engine
pub struct CompanionRuntime {
    shared: Arc<Shared>,
    position_loop: Option<JoinHandle<()>>,
}

impl CompanionRuntime {
    /// Build the engine from `config` and start the position loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(config: &Config, collaborators: Collaborators) -> Result<Self, CompanionError> {
        config.validate()?;

        let start = config.simulation.start_coordinate()?;
        let roster = config.simulation.roster()?;
        let simulator = match config.simulation.seed {
            Some(seed) => PositionSimulator::with_seed(start, roster, seed),
            None => PositionSimulator::new(start, roster),
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let tick_period = Duration::from_millis(config.simulation.tick_interval_ms);

        let shared = Arc::new(Shared {
            simulator: Mutex::new(simulator),
            session: Mutex::new(SessionSlot {
                controller: SessionController::new(config.recording.distance_method.into()),
                clock: None,
            }),
            safety: Mutex::new(SafetyController::new(config.safety.emergency_number.clone())),
            annotations: AnnotationStore::new(),
            collaborators,
            events,
            tick_period,
            fetch_timeout: Duration::from_millis(config.annotations.fetch_timeout_ms),
            default_track_name: config.recording.default_track_name.clone(),
        });

        let position_loop = tokio::spawn(run_position_loop(
            Arc::downgrade(&shared),
            Instant::now() + tick_period,
            tick_period,
        ));

        info!(
            tick_ms = config.simulation.tick_interval_ms,
            teammates = config.simulation.teammates.len(),
            "Companion runtime launched"
        );

        Ok(Self {
            shared,
            position_loop: Some(position_loop),
        })
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<CompanionEvent> {
        self.shared.events.subscribe()
    }

    /// Start recording from the user's current position.
    ///
    /// Returns the session generation.
    pub async fn start_recording(&self) -> Result<u64, CompanionError> {
        let simulator = self.shared.simulator.lock().await;
        let mut slot = self.shared.session.lock().await;

        let seed = simulator.user().coordinate;
        let generation = slot.controller.start(seed)?;

        if let Some(stale) = slot.clock.take() {
            stale.abort();
        }
        let period = self.shared.tick_period;
        slot.clock = Some(tokio::spawn(run_session_clock(
            Arc::downgrade(&self.shared),
            generation,
            Instant::now() + period,
            period,
        )));
        let state = slot.controller.state();
        drop(slot);
        drop(simulator);

        self.shared.emit(CompanionEvent::SessionChanged {
            transition: SessionTransition::Started,
            state,
        });
        Ok(generation)
    }

    /// Stop recording; the draft waits for save or discard
    pub async fn stop_recording(&self) -> Result<(), CompanionError> {
        let mut slot = self.shared.session.lock().await;
        slot.controller.stop()?;
        if let Some(clock) = slot.clock.take() {
            clock.abort();
        }
        let state = slot.controller.state();
        drop(slot);

        self.shared.emit(CompanionEvent::SessionChanged {
            transition: SessionTransition::Stopped,
            state,
        });
        Ok(())
    }

    /// Save the stopped recording and hand it to the library.
    ///
    /// Without a name the configured default is used. If the library
    /// refuses the track it comes back inside [`CompanionError::Handoff`].
    pub async fn save(&self, name: Option<String>) -> Result<Track, CompanionError> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.shared.default_track_name.clone());

        let (track, state) = {
            let mut slot = self.shared.session.lock().await;
            let track = slot.controller.save(name)?;
            (track, slot.controller.state())
        };
        self.shared.emit(CompanionEvent::SessionChanged {
            transition: SessionTransition::Saved,
            state,
        });

        if let Err(source) = self.shared.collaborators.library.store(&track) {
            warn!(track_id = %track.id, error = %source, "Library did not accept saved track");
            self.shared.emit(CompanionEvent::Notice {
                notice: Notice::warning(format!("Track '{}' could not be stored", track.name)),
            });
            return Err(CompanionError::Handoff {
                track: Box::new(track),
                source,
            });
        }
        Ok(track)
    }

    /// Drop the stopped recording
    pub async fn discard(&self) -> Result<(), CompanionError> {
        let state = {
            let mut slot = self.shared.session.lock().await;
            slot.controller.discard()?;
            slot.controller.state()
        };
        self.shared.emit(CompanionEvent::SessionChanged {
            transition: SessionTransition::Discarded,
            state,
        });
        Ok(())
    }

    /// Mark a waypoint at the user's current position
    pub async fn add_waypoint(
        &self,
        kind: WaypointKind,
        note: Option<String>,
    ) -> Result<Waypoint, CompanionError> {
        let simulator = self.shared.simulator.lock().await;
        let mut slot = self.shared.session.lock().await;
        let position = simulator.user().coordinate;
        Ok(slot.controller.add_waypoint(kind, position, note)?)
    }

    /// Raise an SOS alert, or return the active one
    pub async fn trigger_sos(&self) -> SafetyAlert {
        let position = self.user_coordinate().await;
        let altitude = self.shared.altitude();

        let (alert, created) = self.shared.safety.lock().await.trigger(Some(position), altitude);
        if created {
            self.shared.emit(CompanionEvent::AlertRaised {
                alert: alert.clone(),
            });
        }
        alert
    }

    /// Send the SOS to the team with the position as of now
    pub async fn notify_teammates(&self) -> Result<SafetyAlert, CompanionError> {
        let position = self.user_coordinate().await;
        let altitude = self.shared.altitude();

        let alert = self.shared.safety.lock().await.notify_teammates(
            Some(position),
            altitude,
            self.shared.collaborators.chat.as_ref(),
        )?;
        self.shared
            .emit(CompanionEvent::AlertCleared { acknowledged: true });
        Ok(alert)
    }

    /// Clear the active alert without notifying anyone
    pub async fn cancel_sos(&self) -> Option<SafetyAlert> {
        let cancelled = self.shared.safety.lock().await.cancel();
        if cancelled.is_some() {
            self.shared
                .emit(CompanionEvent::AlertCleared { acknowledged: false });
        }
        cancelled
    }

    /// Send an ordinary team chat message
    pub async fn send_team_message(&self, text: &str) -> Result<OutboundMessage, CompanionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CompanionError::EmptyMessage);
        }
        let message = OutboundMessage::new(MessageKind::Chat, SENDER_NAME, text);
        self.shared.collaborators.chat.send(message.clone())?;
        debug!(message_id = %message.id, "Team message sent");
        Ok(message)
    }

    /// Refresh annotations from `source`, bounded by the fetch timeout.
    ///
    /// Emits one notice describing the outcome. On failure the previous
    /// snapshot stays in place.
    pub async fn load_annotations<S: AnnotationSource>(
        &self,
        source: &S,
    ) -> Result<LoadReport, LoadError> {
        let load = self.shared.annotations.load(source);
        let outcome = match timeout(self.shared.fetch_timeout, load).await {
            Ok(result) => result.map(|set| LoadReport::from_set(&set)),
            Err(_) => {
                warn!(
                    source = %source.describe(),
                    timeout_ms = self.shared.fetch_timeout.as_millis() as u64,
                    "Annotation load timed out"
                );
                Err(LoadError::SourceUnreachable(format!(
                    "no response within {} ms",
                    self.shared.fetch_timeout.as_millis()
                )))
            }
        };

        if let Ok(report) = &outcome {
            self.shared
                .emit(CompanionEvent::AnnotationsReplaced { report: *report });
        }
        self.shared.emit(CompanionEvent::Notice {
            notice: Notice::for_load(&outcome),
        });
        outcome
    }

    /// Current annotation snapshot
    pub fn annotations(&self) -> Arc<AnnotationSet> {
        self.shared.annotations.current()
    }

    /// Latest telemetry, if the device is reachable
    pub fn telemetry(&self) -> Option<TelemetryReading> {
        self.shared.collaborators.telemetry.read()
    }

    async fn user_coordinate(&self) -> Coordinate {
        self.shared.simulator.lock().await.user().coordinate
    }

    /// Owned, consistent copy of the engine state
    pub async fn snapshot(&self) -> CompanionSnapshot {
        let simulator = self.shared.simulator.lock().await;
        let slot = self.shared.session.lock().await;
        let safety = self.shared.safety.lock().await;

        let recorder = slot.controller.recorder();
        CompanionSnapshot {
            user: simulator.user(),
            teammates: simulator.teammates(),
            session: SessionView {
                state: slot.controller.state(),
                generation: slot.controller.generation(),
                path: recorder.path().to_vec(),
                waypoints: recorder.waypoints().to_vec(),
                elapsed_seconds: recorder.elapsed_seconds(),
                distance_meters: recorder.distance_meters(),
                distance_method: recorder.distance_method(),
            },
            alert: safety.active().cloned(),
            annotations: self.shared.annotations.current(),
            telemetry: self.shared.collaborators.telemetry.read(),
            emergency_number: safety.emergency_number().to_string(),
        }
    }

    /// Stop both loops. Any unsaved draft is dropped with the runtime.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.position_loop.take() {
            handle.abort();
        }
        if let Some(clock) = self.shared.session.lock().await.clock.take() {
            clock.abort();
        }
        info!("Companion runtime stopped");
    }
}

impl Drop for CompanionRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.position_loop.take() {
            handle.abort();
        }
        if let Ok(mut slot) = self.shared.session.try_lock() {
            if let Some(clock) = slot.clock.take() {
                clock.abort();
            }
        }
    }
}
