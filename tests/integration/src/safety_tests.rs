//! SOS escalation against the running engine

use crate::test_utils::*;
use hikepal_tracking::{CompanionError, CompanionEvent, MessageKind, SafetyError, SessionState};

#[tokio::test(start_paused = true)]
async fn test_trigger_twice_yields_one_alert() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;
    let mut events = runtime.subscribe();

    let first = runtime.trigger_sos().await;
    advance_ms(1_500).await;
    let second = runtime.trigger_sos().await;

    assert_eq!(first, second);
    let raised = drain(&mut events)
        .into_iter()
        .filter(|event| matches!(event, CompanionEvent::AlertRaised { .. }))
        .count();
    assert_eq!(raised, 1);
}

#[tokio::test(start_paused = true)]
async fn test_sos_with_telemetry_unavailable() {
    let companion = TestCompanion::launch(&test_config());
    companion.telemetry.set_connected(false);

    let alert = companion.runtime.trigger_sos().await;

    assert_eq!(alert.altitude_meters, None);
    assert!(!alert.acknowledged);
    assert!(companion.runtime.snapshot().await.alert.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_notify_reports_position_at_call_time() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    runtime.start_recording().await.unwrap();
    let alert = runtime.trigger_sos().await;
    advance_ms(2_500).await;

    let now = runtime.snapshot().await.user.coordinate;
    assert_ne!(Some(now), alert.position);

    let notified = runtime.notify_teammates().await.unwrap();
    assert!(notified.acknowledged);

    let messages = companion.chat.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Sos);
    assert!(messages[0]
        .text
        .contains(&format!("{:.5}, {:.5}", now.latitude, now.longitude)));
}

#[tokio::test(start_paused = true)]
async fn test_sos_is_independent_of_session() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    runtime.start_recording().await.unwrap();
    runtime.trigger_sos().await;
    runtime.stop_recording().await.unwrap();
    runtime.discard().await.unwrap();

    let snapshot = runtime.snapshot().await;
    assert_eq!(snapshot.session.state, SessionState::Idle);
    assert!(snapshot.alert.is_some());

    runtime.cancel_sos().await.unwrap();
    assert!(runtime.snapshot().await.alert.is_none());
    assert!(companion.chat.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_delivery_keeps_alert_for_retry() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;
    companion.chat.set_offline(true);

    runtime.trigger_sos().await;
    assert!(matches!(
        runtime.notify_teammates().await,
        Err(CompanionError::Safety(SafetyError::Delivery(_)))
    ));
    assert!(runtime.snapshot().await.alert.is_some());

    companion.chat.set_offline(false);
    runtime.notify_teammates().await.unwrap();
    assert_eq!(companion.chat.messages().len(), 1);
}
