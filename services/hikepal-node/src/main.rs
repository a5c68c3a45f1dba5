use anyhow::{bail, Context, Result};
use hikepal_annotations::{JsonFileSource, LoadError, UnconfiguredSource};
use hikepal_core::{format_distance_km, format_duration, logging, Config, WaypointKind};
use hikepal_tracking::{
    Collaborators, CompanionEvent, CompanionRuntime, LoadReport, SimulatedTelemetry,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

mod commands;
mod storage;

use commands::{Command, HELP};
use storage::{ConsoleChat, JsonTrackDir};

const NODE_PROTOCOL_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    protocol_version: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            runtime_version: NODE_RUNTIME_VERSION,
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config = match parse_config_path(&args)? {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default_config(),
    };
    logging::init_with(config.logging.json);

    let telemetry = Arc::new(match config.simulation.seed {
        Some(seed) => SimulatedTelemetry::with_seed(seed),
        None => SimulatedTelemetry::new(),
    });
    let library = JsonTrackDir::open(config.node.data_dir.join("tracks"))
        .with_context(|| {
            format!(
                "cannot create track directory under {}",
                config.node.data_dir.display()
            )
        })?;

    let runtime = CompanionRuntime::launch(
        &config,
        Collaborators {
            telemetry: telemetry.clone(),
            chat: Arc::new(ConsoleChat),
            library: Arc::new(library),
        },
    )?;
    info!(data_dir = %config.node.data_dir.display(), "hikepal-node started");

    let printer = tokio::spawn(print_events(runtime.subscribe()));
    // Outcome is reported through the notice event
    let _ = reload_annotations(&runtime, &config).await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(&runtime, &config, &telemetry, command).await {
            println!("error: {}", e);
        }
    }

    printer.abort();
    runtime.shutdown().await;
    Ok(())
}

fn parse_config_path(args: &[String]) -> Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            bail!("--config was provided without a path");
        }
    }
    Ok(None)
}

async fn reload_annotations(
    runtime: &CompanionRuntime,
    config: &Config,
) -> std::result::Result<LoadReport, LoadError> {
    match &config.annotations.source_path {
        Some(path) => runtime.load_annotations(&JsonFileSource::new(path)).await,
        None => runtime.load_annotations(&UnconfiguredSource).await,
    }
}

async fn execute(
    runtime: &CompanionRuntime,
    config: &Config,
    telemetry: &SimulatedTelemetry,
    command: Command,
) -> Result<()> {
    match command {
        Command::Start => {
            runtime.start_recording().await?;
        }
        Command::Stop => runtime.stop_recording().await?,
        Command::Save(name) => {
            let track = runtime.save(name).await?;
            println!("saved {} ({})", track.summary(), track.id);
        }
        Command::Discard => runtime.discard().await?,
        Command::Mark(note) => {
            let waypoint = runtime.add_waypoint(WaypointKind::Marker, note).await?;
            println!("marked {}", waypoint.id);
        }
        Command::Photo(note) => {
            let waypoint = runtime.add_waypoint(WaypointKind::Photo, note).await?;
            println!("photo {}", waypoint.id);
        }
        Command::Sos => {
            runtime.trigger_sos().await;
        }
        Command::Notify => {
            runtime.notify_teammates().await?;
        }
        Command::Cancel => {
            if runtime.cancel_sos().await.is_none() {
                println!("no active alert");
            }
        }
        Command::Say(text) => {
            runtime.send_team_message(&text).await?;
        }
        Command::Reload => {
            // Outcome is reported through the notice event
            let _ = reload_annotations(runtime, config).await;
        }
        Command::Status => print_status(runtime).await,
        Command::Device(connected) => telemetry.set_connected(connected),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

async fn print_status(runtime: &CompanionRuntime) {
    let snapshot = runtime.snapshot().await;
    let session = &snapshot.session;
    println!(
        "user {:.5}, {:.5} | {} | {} | {} | {} points, {} waypoints",
        snapshot.user.coordinate.latitude,
        snapshot.user.coordinate.longitude,
        session.state,
        format_duration(session.elapsed_seconds),
        format_distance_km(session.distance_meters),
        session.path.len(),
        session.waypoints.len(),
    );
    for teammate in &snapshot.teammates {
        println!(
            "  {} {:.5}, {:.5}",
            teammate.display_name, teammate.position.latitude, teammate.position.longitude
        );
    }
    match snapshot.telemetry {
        Some(t) => println!(
            "  {}m, {} bpm, {:.1} kcal, battery {}%",
            t.altitude_meters, t.heart_rate_bpm, t.calories, t.battery_pct
        ),
        None => println!("  wearable disconnected"),
    }
    println!(
        "  {} facilities, {} hazards",
        snapshot.annotations.facility_count(),
        snapshot.annotations.hazard_count()
    );
    for hazard in snapshot.annotations.hazards_containing(&snapshot.user.coordinate) {
        println!("  ⚠ {}: {}", hazard.hazard_type.label(), hazard.message);
    }
    if let Some(alert) = snapshot.alert {
        println!(
            "  SOS active since {} (call {})",
            alert.triggered_at, snapshot.emergency_number
        );
    }
}

/// Echo the events a user cares about; per-tick movement stays in the logs
async fn print_events(mut events: tokio::sync::broadcast::Receiver<CompanionEvent>) {
    loop {
        match events.recv().await {
            Ok(CompanionEvent::SessionChanged { transition, state }) => {
                println!("session {:?} -> {}", transition, state);
            }
            Ok(CompanionEvent::AlertRaised { alert }) => {
                println!("SOS raised at {}", alert.triggered_at);
            }
            Ok(CompanionEvent::AlertCleared { acknowledged }) => {
                println!("SOS cleared (team notified: {})", acknowledged);
            }
            Ok(CompanionEvent::Notice { notice }) => {
                println!("[{:?}] {}", notice.level, notice.text);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event printer lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
