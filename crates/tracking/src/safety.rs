//! SOS escalation
//!
//! Runs beside the session state machine rather than inside it: an alert
//! can be raised whatever the recording state. At most one alert is active.
//! `notify_teammates` and `cancel` both end it.

use chrono::{DateTime, Utc};
use hikepal_core::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collaborators::{MessageKind, MessageSink, OutboundMessage, SENDER_NAME};
use crate::error::SafetyError;

/// An emergency raised by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAlert {
    pub triggered_at: DateTime<Utc>,
    /// `None` when the position was unknown at trigger time
    pub position: Option<Coordinate>,
    /// `None` when telemetry was unavailable at trigger time
    pub altitude_meters: Option<i32>,
    pub acknowledged: bool,
}

/// Emergency escalation overlay
#[derive(Debug)]
pub struct SafetyController {
    active: Option<SafetyAlert>,
    emergency_number: String,
}

impl SafetyController {
    pub fn new(emergency_number: impl Into<String>) -> Self {
        Self {
            active: None,
            emergency_number: emergency_number.into(),
        }
    }

    /// Raise an alert, or return the one already active.
    ///
    /// The flag is `true` when a new alert was created.
    pub fn trigger(
        &mut self,
        position: Option<Coordinate>,
        altitude_meters: Option<i32>,
    ) -> (SafetyAlert, bool) {
        if let Some(existing) = &self.active {
            return (existing.clone(), false);
        }

        let alert = SafetyAlert {
            triggered_at: Utc::now(),
            position,
            altitude_meters,
            acknowledged: false,
        };
        if position.is_none() || altitude_meters.is_none() {
            warn!(
                position_known = position.is_some(),
                altitude_known = altitude_meters.is_some(),
                "SOS raised with incomplete location data"
            );
        }
        info!(triggered_at = %alert.triggered_at, "SOS alert raised");

        self.active = Some(alert.clone());
        (alert, true)
    }

    /// Send the SOS message with the *current* position and altitude.
    ///
    /// On success the alert is acknowledged and cleared. If delivery fails
    /// the alert stays active so the user can retry.
    pub fn notify_teammates(
        &mut self,
        position: Option<Coordinate>,
        altitude_meters: Option<i32>,
        sink: &dyn MessageSink,
    ) -> Result<SafetyAlert, SafetyError> {
        let Some(alert) = self.active.as_ref() else {
            return Err(SafetyError::NoActiveAlert);
        };

        let text = compose_sos_message(position, altitude_meters);
        let message = OutboundMessage::new(MessageKind::Sos, SENDER_NAME, text);
        if let Err(e) = sink.send(message) {
            warn!(error = %e, "SOS notification failed, alert remains active");
            return Err(e.into());
        }

        let mut finished = alert.clone();
        finished.acknowledged = true;
        self.active = None;

        info!(triggered_at = %finished.triggered_at, "SOS sent to team");
        Ok(finished)
    }

    /// Clear the active alert without notifying; returns it if there was one
    pub fn cancel(&mut self) -> Option<SafetyAlert> {
        let cancelled = self.active.take();
        if cancelled.is_some() {
            info!("SOS alert cancelled");
        }
        cancelled
    }

    pub fn active(&self) -> Option<&SafetyAlert> {
        self.active.as_ref()
    }

    /// Number shown on the emergency overlay
    pub fn emergency_number(&self) -> &str {
        &self.emergency_number
    }
}

/// Team message text for an SOS
pub fn compose_sos_message(position: Option<Coordinate>, altitude_meters: Option<i32>) -> String {
    let location = match position {
        Some(c) => format!("{:.5}, {:.5}", c.latitude, c.longitude),
        None => "unknown".to_string(),
    };
    let altitude = altitude_meters.map_or_else(|| "unknown".to_string(), |a| format!("{}m", a));
    format!("🚨 SOS! Emergency at {}. Altitude: {}.", location, altitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ChatLog;

    fn here() -> Coordinate {
        Coordinate::new(22.2225, 114.2415).unwrap()
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let mut safety = SafetyController::new("999");

        let (first, created) = safety.trigger(Some(here()), Some(284));
        assert!(created);
        let (second, created) = safety.trigger(None, None);
        assert!(!created);

        assert_eq!(first, second);
        assert_eq!(safety.active(), Some(&first));
    }

    #[test]
    fn test_unknown_fields_degrade() {
        let mut safety = SafetyController::new("999");
        let (alert, _) = safety.trigger(Some(here()), None);

        assert_eq!(alert.altitude_meters, None);
        assert_eq!(alert.position, Some(here()));
        assert!(!alert.acknowledged);
    }

    #[test]
    fn test_notify_uses_current_position() {
        let mut safety = SafetyController::new("999");
        let chat = ChatLog::new();
        safety.trigger(Some(here()), Some(284));

        let moved = Coordinate::new(22.22301, 114.24212).unwrap();
        let alert = safety.notify_teammates(Some(moved), Some(286), &chat).unwrap();

        assert!(alert.acknowledged);
        assert!(safety.active().is_none());
        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Sos);
        assert_eq!(messages[0].sender_name, SENDER_NAME);
        assert_eq!(
            messages[0].text,
            "🚨 SOS! Emergency at 22.22301, 114.24212. Altitude: 286m."
        );
    }

    #[test]
    fn test_notify_without_alert() {
        let mut safety = SafetyController::new("999");
        let chat = ChatLog::new();

        assert_eq!(
            safety.notify_teammates(Some(here()), Some(1), &chat),
            Err(SafetyError::NoActiveAlert)
        );
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_failed_notify_keeps_alert() {
        let mut safety = SafetyController::new("999");
        let chat = ChatLog::new();
        chat.set_offline(true);
        safety.trigger(Some(here()), Some(284));

        let result = safety.notify_teammates(Some(here()), Some(284), &chat);
        assert!(matches!(result, Err(SafetyError::Delivery(_))));
        assert!(safety.active().is_some());
    }

    #[test]
    fn test_cancel() {
        let mut safety = SafetyController::new("112");
        assert!(safety.cancel().is_none());

        safety.trigger(None, None);
        assert!(safety.cancel().is_some());
        assert!(safety.active().is_none());
        assert_eq!(safety.emergency_number(), "112");
    }

    #[test]
    fn test_message_with_unknowns() {
        assert_eq!(
            compose_sos_message(None, None),
            "🚨 SOS! Emergency at unknown. Altitude: unknown."
        );
    }
}
