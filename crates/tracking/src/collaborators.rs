//! Interfaces to the collaborators the engine calls into: the team chat
//! and the history/library that takes saved tracks.
//!
//! In-memory implementations are provided for tests and the demo node.

use chrono::{DateTime, Utc};
use hikepal_core::Track;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::error::{ChatError, LibraryError};

/// Sender name on every message the local user sends
pub const SENDER_NAME: &str = "Me";

/// Kind of outbound chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Ordinary team chat
    Chat,
    /// Emergency notification
    Sos,
}

/// Message handed to the chat collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub id: String,
    pub kind: MessageKind,
    pub sender_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl OutboundMessage {
    pub fn new(kind: MessageKind, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            sender_name: sender_name.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Team chat delivery
pub trait MessageSink: Send + Sync {
    /// Deliver one message
    fn send(&self, message: OutboundMessage) -> Result<(), ChatError>;
}

/// History/library that takes ownership of saved tracks
pub trait TrackLibrary: Send + Sync {
    /// Store a finished track
    fn store(&self, track: &Track) -> Result<(), LibraryError>;
}

/// In-memory chat log; can be switched offline to simulate delivery failures
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Mutex<Vec<OutboundMessage>>,
    offline: AtomicBool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of every delivered message, oldest first
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MessageSink for ChatLog {
    fn send(&self, message: OutboundMessage) -> Result<(), ChatError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChatError::Delivery("chat is offline".to_string()));
        }
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}

/// In-memory track library
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    tracks: Mutex<Vec<Track>>,
    read_only: AtomicBool,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent stores fail (or succeed again)
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Stored tracks in save order
    pub fn tracks(&self) -> Vec<Track> {
        self.tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TrackLibrary for MemoryLibrary {
    fn store(&self, track: &Track) -> Result<(), LibraryError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(LibraryError::Storage("library is read-only".to_string()));
        }
        self.tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(track.clone());
        Ok(())
    }
}
