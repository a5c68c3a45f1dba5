//! Test utilities for cross-crate scenarios

use hikepal_core::Config;
use hikepal_tracking::{
    ChatLog, Collaborators, CompanionEvent, CompanionRuntime, MemoryLibrary, SimulatedTelemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Dragon's Back trailhead used by every scenario
pub const START: (f64, f64) = (22.2225, 114.2415);

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// Default configuration with a fixed seed
pub fn test_config() -> Config {
    let mut config = Config::default_config();
    config.simulation.seed = Some(2024);
    config.simulation.start_latitude = START.0;
    config.simulation.start_longitude = START.1;
    config
}

/// Runtime plus handles on its in-memory collaborators
pub struct TestCompanion {
    pub runtime: CompanionRuntime,
    pub telemetry: Arc<SimulatedTelemetry>,
    pub chat: Arc<ChatLog>,
    pub library: Arc<MemoryLibrary>,
}

impl TestCompanion {
    /// Launch against `config`; must run inside a tokio runtime
    pub fn launch(config: &Config) -> Self {
        init_tracing();
        let telemetry = Arc::new(SimulatedTelemetry::with_seed(7));
        let chat = Arc::new(ChatLog::new());
        let library = Arc::new(MemoryLibrary::new());

        let runtime = CompanionRuntime::launch(
            config,
            Collaborators {
                telemetry: telemetry.clone(),
                chat: chat.clone(),
                library: library.clone(),
            },
        )
        .expect("test config should launch");

        Self {
            runtime,
            telemetry,
            chat,
            library,
        }
    }
}

/// Let the paused clock run for `ms` milliseconds
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Everything currently queued on `events`
pub fn drain(events: &mut broadcast::Receiver<CompanionEvent>) -> Vec<CompanionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
