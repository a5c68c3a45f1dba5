//! HikePal Tracking - live position, recording, session and SOS state
//!
//! Synchronous state types with one mutation entry point each
//! ([`PositionSimulator`], [`PathRecorder`], [`SessionController`],
//! [`SafetyController`]) and an async [`CompanionRuntime`] that drives them
//! from two 1 Hz loops and broadcasts [`CompanionEvent`]s to observers.

pub mod collaborators;
pub mod error;
pub mod events;
pub mod recorder;
pub mod runtime;
pub mod safety;
pub mod session;
pub mod simulator;
pub mod telemetry;

pub use collaborators::{
    ChatLog, MemoryLibrary, MessageKind, MessageSink, OutboundMessage, TrackLibrary,
    SENDER_NAME,
};
pub use error::{
    ChatError, CompanionError, LibraryError, RecorderError, SafetyError, SessionError,
};
pub use events::{
    CompanionEvent, CompanionSnapshot, LoadReport, Notice, NoticeLevel, SessionTransition,
    SessionView,
};
pub use recorder::PathRecorder;
pub use runtime::{Collaborators, CompanionRuntime};
pub use safety::{compose_sos_message, SafetyAlert, SafetyController};
pub use session::{SessionAction, SessionController, SessionState};
pub use simulator::{PositionSimulator, TickOutcome};
pub use telemetry::{SimulatedTelemetry, TelemetryReading, TelemetrySource};
