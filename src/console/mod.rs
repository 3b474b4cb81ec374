//! Console mode - operator-facing output on stdout
//!
//! Two renderings of the same engine events:
//!
//! - **Plain** (default): one activity line per entry,
//!   `[HH:MM:SS] LEVEL message`, plus a status block on request.
//! - **JSON** (`--json`): NDJSON, one event per line, each with an `event`
//!   field naming its type.
//!
//! # Example JSON Output
//!
//! ```json
//! {"event":"status_changed","old_status":"idle","new_status":"starting","generation":1,"timestamp":1704700001000}
//! {"event":"log","seq":0,"level":"info","message":"Starting bot...","time":"10:15:02","timestamp":1704700001000}
//! {"event":"pairing_code","code":"K7Q2M9XA","timestamp":1704700002000}
//! ```

pub mod command;
pub mod runner;

use std::io::{self, Write};

use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::Serialize;
use tracing::error;

use botdeck_app::{EngineEvent, SessionSnapshot};
use botdeck_core::{LogEntry, SessionStatus};

pub use command::{ConsoleCommand, UnknownCommand, HELP_TEXT};
pub use runner::{run_console, ConsoleOptions};

/// How console output is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Plain,
    Json,
}

/// Events written to stdout in JSON mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// Session lifecycle transition
    StatusChanged {
        old_status: SessionStatus,
        new_status: SessionStatus,
        generation: u64,
        timestamp: i64,
    },

    /// A pairing code is ready to be entered on the phone
    PairingCode { code: String, timestamp: i64 },

    /// The pairing code is no longer valid
    PairingCodeCleared { timestamp: i64 },

    /// Activity log entry
    Log {
        seq: u64,
        level: String,
        message: String,
        time: String,
        timestamp: i64,
    },

    /// Processed-message counter changed
    MessageCount { count: u64, timestamp: i64 },

    /// Reply to `status`
    Status {
        session: SessionSnapshot,
        timestamp: i64,
    },

    /// Reply to `help`
    Help { text: String, timestamp: i64 },

    /// Console-level error (bad command, runtime failure)
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// Engine is shutting down
    Shutdown { timestamp: i64 },
}

impl ConsoleEvent {
    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Map an engine event to its console form
    pub fn from_engine(event: &EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::StatusChanged {
                generation,
                old_status,
                new_status,
            } => Self::StatusChanged {
                old_status: *old_status,
                new_status: *new_status,
                generation: *generation,
                timestamp,
            },
            EngineEvent::PairingCodeIssued { code } => Self::PairingCode {
                code: code.to_string(),
                timestamp,
            },
            EngineEvent::PairingCodeCleared => Self::PairingCodeCleared { timestamp },
            EngineEvent::LogEntry { entry } => Self::log(entry),
            EngineEvent::MessageCountChanged { count } => Self::MessageCount {
                count: *count,
                timestamp,
            },
            EngineEvent::Shutdown => Self::Shutdown { timestamp },
        }
    }

    pub fn log(entry: &LogEntry) -> Self {
        Self::Log {
            seq: entry.seq,
            level: entry.severity.as_str().to_string(),
            message: entry.message.clone(),
            time: entry.formatted_time(),
            timestamp: entry.timestamp.timestamp_millis(),
        }
    }

    pub fn status(session: SessionSnapshot) -> Self {
        Self::Status {
            session,
            timestamp: Self::now(),
        }
    }

    pub fn help() -> Self {
        Self::Help {
            text: HELP_TEXT.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }

    /// Plain-text rendering, `None` for events plain mode does not show.
    ///
    /// Lifecycle events are already visible through their activity entries.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Self::Log {
                level,
                message,
                time,
                ..
            } => Some(format!("[{time}] {:<7} {message}", level.to_uppercase())),
            Self::Status { session, .. } => Some(render_status(session, Local::now())),
            Self::Help { text, .. } => Some(text.clone()),
            Self::Error { message, .. } => Some(format!("error: {message}")),
            Self::StatusChanged { .. }
            | Self::PairingCode { .. }
            | Self::PairingCodeCleared { .. }
            | Self::MessageCount { .. }
            | Self::Shutdown { .. } => None,
        }
    }

    /// Write this event to stdout in the given mode
    pub fn emit(&self, mode: OutputMode) {
        let line = match mode {
            OutputMode::Json => match serde_json::to_string(self) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize console event: {}", e);
                    return;
                }
            },
            OutputMode::Plain => match self.plain_text() {
                Some(text) => text,
                None => return,
            },
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            error!("Failed to write console output: {}", e);
            return;
        }

        // Flush so piped consumers see each line immediately
        if let Err(e) = stdout.flush() {
            error!("Failed to flush stdout: {}", e);
        }
    }
}

/// Multi-line status block for plain mode
fn render_status(session: &SessionSnapshot, now: DateTime<Local>) -> String {
    let connection = if session.online { "Online" } else { "Offline" };
    let mut out = format!("Status:        {} ({connection})", session.status);
    out.push_str(&format!(
        "\nNumber:        {}",
        session.phone_number.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!(
        "\nPairing code:  {}",
        session
            .pairing_code
            .as_ref()
            .map(|code| code.as_str())
            .unwrap_or("-")
    ));
    out.push_str(&format!("\nMessages:      {}", session.message_count));
    if let Some(started_at) = session.started_at {
        out.push_str(&format!("\nStarted at:    {}", started_at.format("%H:%M:%S")));
    }
    if let Some(uptime) = session.uptime(now) {
        out.push_str(&format!("\nUptime:        {}", format_uptime(uptime)));
    }
    out.push_str(&format!("\nLog entries:   {}", session.log_entries.len()));
    out
}

/// `1h 02m 05s`, dropping the hour part under an hour
fn format_uptime(uptime: TimeDelta) -> String {
    let secs = uptime.num_seconds();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}
