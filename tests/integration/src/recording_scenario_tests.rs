//! Recording lifecycle scenarios driven through the async runtime

use crate::test_utils::*;
use hikepal_core::{Coordinate, TrackRecord, WaypointKind};
use hikepal_tracking::{CompanionError, CompanionEvent, SessionState, SessionTransition};

#[tokio::test(start_paused = true)]
async fn test_evening_hike_scenario() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;
    let start = Coordinate::new(START.0, START.1).unwrap();

    runtime.start_recording().await.unwrap();
    advance_ms(3_500).await;

    let snapshot = runtime.snapshot().await;
    assert_eq!(snapshot.session.path.len(), 4);
    assert_eq!(snapshot.session.elapsed_seconds, 3);
    assert_eq!(snapshot.session.path[0], start);

    let waypoint = runtime
        .add_waypoint(WaypointKind::Marker, Some("rockfall".to_string()))
        .await
        .unwrap();
    assert_eq!(waypoint.position, snapshot.user.coordinate);
    assert_eq!(runtime.snapshot().await.session.waypoints.len(), 1);

    runtime.stop_recording().await.unwrap();
    let track = runtime.save(Some("Evening Hike".to_string())).await.unwrap();

    assert_eq!(track.name, "Evening Hike");
    assert_eq!(track.path.len(), 4);
    assert_eq!(track.path, snapshot.session.path);
    assert_eq!(track.waypoints.len(), 1);
    assert_eq!(track.waypoints[0].note.as_deref(), Some("rockfall"));
    assert_eq!(track.duration_seconds, 3);
    assert_eq!(track.distance_meters, 20.0);
    assert_eq!(companion.library.tracks(), vec![track]);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_increases_then_freezes_on_stop() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    runtime.start_recording().await.unwrap();
    // Sample between clock ticks
    advance_ms(500).await;
    let mut previous = 0;
    for _ in 0..5 {
        advance_ms(1_000).await;
        let elapsed = runtime.snapshot().await.session.elapsed_seconds;
        assert_eq!(elapsed, previous + 1);
        previous = elapsed;
    }

    runtime.stop_recording().await.unwrap();
    advance_ms(10_000).await;
    assert_eq!(runtime.snapshot().await.session.elapsed_seconds, previous);
}

#[tokio::test(start_paused = true)]
async fn test_teammates_move_in_every_state() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    advance_ms(500).await;
    let idle_before = runtime.snapshot().await;
    advance_ms(1_000).await;
    let idle_after = runtime.snapshot().await;
    assert_eq!(idle_before.user.coordinate, idle_after.user.coordinate);
    assert_ne!(idle_before.teammates, idle_after.teammates);

    runtime.start_recording().await.unwrap();
    advance_ms(1_000).await;
    let recording = runtime.snapshot().await;
    assert_ne!(recording.user.coordinate, idle_after.user.coordinate);
    assert_ne!(recording.teammates, idle_after.teammates);

    runtime.stop_recording().await.unwrap();
    advance_ms(1_000).await;
    let finished = runtime.snapshot().await;
    assert_eq!(finished.session.state, SessionState::Finished);
    assert_eq!(finished.user.coordinate, recording.user.coordinate);
    assert_ne!(finished.teammates, recording.teammates);
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_events_in_order() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;
    let mut events = runtime.subscribe();

    runtime.start_recording().await.unwrap();
    runtime.stop_recording().await.unwrap();
    runtime.discard().await.unwrap();

    let transitions: Vec<SessionTransition> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            CompanionEvent::SessionChanged { transition, .. } => Some(transition),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            SessionTransition::Started,
            SessionTransition::Stopped,
            SessionTransition::Discarded
        ]
    );
    assert!(companion.library.tracks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_second_start_while_recording_rejected() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    let generation = runtime.start_recording().await.unwrap();
    advance_ms(1_500).await;

    assert!(matches!(
        runtime.start_recording().await,
        Err(CompanionError::Session(_))
    ));
    let snapshot = runtime.snapshot().await;
    assert_eq!(snapshot.session.generation, generation);
    assert_eq!(snapshot.session.path.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_saved_track_persists_in_documented_layout() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    runtime.start_recording().await.unwrap();
    advance_ms(2_500).await;
    runtime.add_waypoint(WaypointKind::Photo, None).await.unwrap();
    runtime.stop_recording().await.unwrap();
    let track = runtime.save(None).await.unwrap();

    let json = serde_json::to_value(TrackRecord::from(&track)).unwrap();
    assert_eq!(json["name"], "My Hike");
    assert_eq!(json["durationSeconds"], 2);
    assert_eq!(json["distanceMethod"], "approximate-v1");
    assert_eq!(json["path"].as_array().unwrap().len(), 3);
    assert_eq!(json["path"][0][0], START.0);
    assert_eq!(json["waypoints"][0]["kind"], "photo");
    assert_eq!(json["waypoints"][0]["note"], "Photo taken here");

    let restored: TrackRecord = serde_json::from_value(json).unwrap();
    let round_tripped = restored.into_track().unwrap();
    assert_eq!(round_tripped.path, track.path);
    assert_eq!(round_tripped.waypoints, track.waypoints);
}
