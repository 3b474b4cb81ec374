//! The bot session - lifecycle state, pairing code and message counter

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;

use botdeck_core::{Error, LogEntry, PairingCode, Result, SessionStatus};

/// Session generation id.
///
/// Bumped by every accepted `start` and by stopping a running session.
/// Scheduled callbacks carry the generation they were created for and are
/// discarded once it is no longer current.
pub type Generation = u64;

/// Trim an operator-supplied phone number, rejecting blank input
pub fn validate_phone_number(phone_number: &str) -> Result<String> {
    let trimmed = phone_number.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Enter a phone number first"));
    }
    Ok(trimmed.to_string())
}

/// The single mutable session
#[derive(Debug, Clone, Default)]
pub struct BotSession {
    pub phone_number: String,
    pub pairing_code: Option<PairingCode>,
    pub status: SessionStatus,
    /// Simulated messages processed; survives stop/start until reset
    pub message_count: u64,
    pub generation: Generation,
    pub started_at: Option<DateTime<Local>>,
    pub connected_at: Option<DateTime<Local>>,
}

impl BotSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `begin` would accept this phone number right now.
    ///
    /// Returns the trimmed number.
    pub fn check_begin(&self, phone_number: &str) -> Result<String> {
        let phone_number = validate_phone_number(phone_number)?;
        if self.status.is_running() {
            return Err(Error::already_running(self.status.label()));
        }
        Ok(phone_number)
    }

    /// `Idle -> Starting`. Returns the generation the new run belongs to.
    pub fn begin(&mut self, phone_number: &str) -> Result<Generation> {
        let phone_number = self.check_begin(phone_number)?;

        self.generation += 1;
        self.phone_number = phone_number;
        self.pairing_code = None;
        self.status = SessionStatus::Starting;
        self.started_at = Some(Local::now());
        self.connected_at = None;
        Ok(self.generation)
    }

    /// Whether a callback scheduled for `generation` may still act
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// `Starting -> PairingIssued`, only for the current generation
    pub fn issue_pairing_code(&mut self, generation: Generation, code: PairingCode) -> bool {
        if !self.is_current(generation) || self.status != SessionStatus::Starting {
            return false;
        }
        self.pairing_code = Some(code);
        self.status = SessionStatus::PairingIssued;
        true
    }

    /// `PairingIssued -> Connected`, only for the current generation
    pub fn connect(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) || self.status != SessionStatus::PairingIssued {
            return false;
        }
        self.status = SessionStatus::Connected;
        self.connected_at = Some(Local::now());
        true
    }

    /// Count one inbound message, only while connected in `generation`
    pub fn record_inbound(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) || self.status != SessionStatus::Connected {
            return false;
        }
        self.message_count += 1;
        true
    }

    /// Any state -> `Idle`.
    ///
    /// Returns the generation whose scheduled work must be cancelled, or
    /// `None` when nothing was running. Stopping while idle changes nothing.
    pub fn stop(&mut self) -> Option<Generation> {
        if !self.status.is_running() {
            return None;
        }
        let previous = self.generation;
        self.generation += 1;
        self.status = SessionStatus::Idle;
        self.pairing_code = None;
        self.started_at = None;
        self.connected_at = None;
        Some(previous)
    }

    pub fn reset_message_count(&mut self) {
        self.message_count = 0;
    }
}

/// Read-only projection of the session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub online: bool,
    pub phone_number: Option<String>,
    pub pairing_code: Option<PairingCode>,
    pub message_count: u64,
    pub generation: Generation,
    pub started_at: Option<DateTime<Local>>,
    pub connected_at: Option<DateTime<Local>>,
    pub log_entries: Vec<LogEntry>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::capture(&BotSession::default(), Vec::new())
    }
}

impl SessionSnapshot {
    pub fn capture(session: &BotSession, log_entries: Vec<LogEntry>) -> Self {
        Self {
            status: session.status,
            online: session.status.is_online(),
            phone_number: (!session.phone_number.is_empty()).then(|| session.phone_number.clone()),
            pairing_code: session.pairing_code.clone(),
            message_count: session.message_count,
            generation: session.generation,
            started_at: session.started_at,
            connected_at: session.connected_at,
            log_entries,
        }
    }

    /// Time spent online as of `now`; `None` unless connected
    pub fn uptime(&self, now: DateTime<Local>) -> Option<TimeDelta> {
        self.connected_at
            .map(|connected_at| (now - connected_at).max(TimeDelta::zero()))
    }
}
