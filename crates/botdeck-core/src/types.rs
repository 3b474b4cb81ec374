//! Core domain type definitions

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the bot session
///
/// `Idle` is initial. The machine is cyclic: `stop` returns any state to
/// `Idle` and a new `start` can follow indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session running
    #[default]
    Idle,
    /// Start accepted, waiting for a pairing code
    Starting,
    /// Pairing code shown to the operator, waiting for the link to complete
    PairingIssued,
    /// Linked and receiving (simulated) inbound events
    Connected,
}

impl SessionStatus {
    /// Whether a session is in progress (anything but `Idle`)
    pub fn is_running(&self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }

    /// Whether the session is linked
    pub fn is_online(&self) -> bool {
        matches!(self, SessionStatus::Connected)
    }

    /// Whether a pairing code may be present in this state
    pub fn has_pairing_code(&self) -> bool {
        matches!(self, SessionStatus::PairingIssued | SessionStatus::Connected)
    }

    /// Stable lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Starting => "starting",
            SessionStatus::PairingIssued => "pairing_issued",
            SessionStatus::Connected => "connected",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Activity log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Get display prefix for severity
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Info => "INF",
            Severity::Success => "OK ",
            Severity::Warning => "WRN",
            Severity::Error => "ERR",
        }
    }

    /// Lowercase name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single activity log record
///
/// Immutable once appended; the log hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Position in the log's append order, never reused
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current wall-clock time
    pub fn new(seq: u64, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            seq,
            timestamp: Local::now(),
            severity,
            message: message.into(),
        }
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Format for single-line display
    pub fn display_line(&self) -> String {
        format!(
            "[{}] {} {}",
            self.formatted_time(),
            self.severity.prefix(),
            self.message
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
