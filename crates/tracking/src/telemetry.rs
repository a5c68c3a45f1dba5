//! Ambient telemetry from the wearable.
//!
//! The engine only needs altitude (for SOS alerts); the full reading is
//! exposed for the dashboard. [`SimulatedTelemetry`] stands in for the
//! device link and drifts its values once per recorded second.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// One snapshot of the wearable's sensors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub altitude_meters: i32,
    pub heart_rate_bpm: u16,
    pub battery_pct: u8,
    pub calories: f64,
}

impl Default for TelemetryReading {
    fn default() -> Self {
        Self {
            temperature_c: 24.0,
            humidity_pct: 78,
            altitude_meters: 284,
            heart_rate_bpm: 110,
            battery_pct: 85,
            calories: 320.0,
        }
    }
}

/// On-demand telemetry provider
pub trait TelemetrySource: Send + Sync {
    /// Latest reading, or `None` when the device is unavailable
    fn read(&self) -> Option<TelemetryReading>;

    /// Called once per second of recording
    fn on_recording_second(&self) {}
}

const HEART_RATE_MIN: u16 = 60;
const HEART_RATE_MAX: u16 = 180;

#[derive(Debug)]
struct SimulatedState {
    reading: TelemetryReading,
    connected: bool,
    rng: StdRng,
}

/// Simulated wearable with drifting altitude, heart rate and calories
#[derive(Debug)]
pub struct SimulatedTelemetry {
    state: Mutex<SimulatedState>,
}

impl SimulatedTelemetry {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                reading: TelemetryReading::default(),
                connected: true,
                rng,
            }),
        }
    }

    /// Connect or disconnect the simulated device link
    pub fn set_connected(&self, connected: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.connected = connected;
        debug!(connected, "Telemetry link changed");
    }

    pub fn is_connected(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .connected
    }
}

impl Default for SimulatedTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SimulatedTelemetry {
    fn read(&self) -> Option<TelemetryReading> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.connected.then_some(state.reading)
    }

    fn on_recording_second(&self) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        let climb: i32 = if state.rng.gen_bool(0.5) { 1 } else { -1 };
        state.reading.altitude_meters = (state.reading.altitude_meters + climb).max(0);

        let pulse = i32::from(state.reading.heart_rate_bpm) + state.rng.gen_range(-2..=2);
        state.reading.heart_rate_bpm =
            pulse.clamp(i32::from(HEART_RATE_MIN), i32::from(HEART_RATE_MAX)) as u16;

        state.reading.calories += 0.5;
    }
}
