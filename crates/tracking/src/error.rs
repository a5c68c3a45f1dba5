//! Error types for tracking, session and safety operations.
//!
//! None of these are fatal: every failure leaves state unchanged (or
//! degraded) and is reported to the caller.

use hikepal_core::{CoreError, Track};
use thiserror::Error;

use crate::session::{SessionAction, SessionState};

/// Path recorder misuse
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RecorderError {
    /// Operation needs an active, unhalted recording
    #[error("No recording is active")]
    NotRecording,
}

/// Session state machine misuse
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Action not allowed from the current state; nothing changed
    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        /// State the session was in
        from: SessionState,
        /// Action that was attempted
        action: SessionAction,
    },

    /// Recorder refused the operation
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),
}

/// Outbound chat failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Messaging collaborator could not deliver
    #[error("Message delivery failed: {0}")]
    Delivery(String),
}

/// History/library hand-off failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LibraryError {
    /// Library refused or failed to store the track
    #[error("Track storage failed: {0}")]
    Storage(String),
}

/// SOS workflow failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SafetyError {
    /// `notify` without a triggered alert
    #[error("No active safety alert")]
    NoActiveAlert,

    /// Notification could not be sent; the alert stays active
    #[error("SOS notification not delivered: {0}")]
    Delivery(#[from] ChatError),
}

/// Errors surfaced by [`crate::runtime::CompanionRuntime`]
#[derive(Debug, Error)]
pub enum CompanionError {
    /// Session transition rejected
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Recorder operation rejected
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    /// SOS operation failed
    #[error(transparent)]
    Safety(#[from] SafetyError),

    /// Chat message not delivered
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Track was finalized but the library did not take it; the track is
    /// returned here so the caller can retry
    #[error("Track {} was saved but not stored: {source}", .track.id)]
    Handoff {
        /// The finalized track
        track: Box<Track>,
        /// Library failure
        source: LibraryError,
    },

    /// Blank chat message
    #[error("Cannot send an empty message")]
    EmptyMessage,

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] CoreError),
}
