//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. The console runner renders from them.

use botdeck_core::{LogEntry, PairingCode, SessionStatus};

use crate::session::Generation;

/// Domain events emitted by the Engine for external consumers.
///
/// Events are broadcast after each message processing cycle, so subscribers
/// see a consistent view of state changes.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────
    /// The session moved to a new lifecycle state
    StatusChanged {
        generation: Generation,
        old_status: SessionStatus,
        new_status: SessionStatus,
    },

    /// A pairing code is now displayed
    PairingCodeIssued { code: PairingCode },

    /// The pairing code was cleared (session stopped)
    PairingCodeCleared,

    // ─────────────────────────────────────────────────────────
    // Activity
    // ─────────────────────────────────────────────────────────
    /// A new activity entry was appended
    LogEntry { entry: LogEntry },

    /// The processed-message counter changed
    MessageCountChanged { count: u64 },

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "status_changed",
            Self::PairingCodeIssued { .. } => "pairing_code_issued",
            Self::PairingCodeCleared => "pairing_code_cleared",
            Self::LogEntry { .. } => "log_entry",
            Self::MessageCountChanged { .. } => "message_count_changed",
            Self::Shutdown => "shutdown",
        }
    }
}
