//! Application state (the Model in TEA)

use std::sync::Arc;

use botdeck_core::{ActivityLog, PairingCodeGenerator, RandomPairingCodes};

use crate::config::Settings;
use crate::session::{BotSession, SessionSnapshot};
use crate::simulator::MessageSimulator;

/// Engine lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    /// Shutdown requested; the event loop exits after the current message
    Quitting,
}

/// Complete application state (the Model in TEA)
///
/// Owns the session and its activity log exclusively. Only `handler::update`
/// mutates it, one message at a time.
#[derive(Debug)]
pub struct AppState {
    pub phase: AppPhase,

    pub session: BotSession,

    pub activity: ActivityLog,

    pub settings: Settings,

    pub simulator: MessageSimulator,

    /// Where pairing codes come from
    pub pairing_codes: Arc<dyn PairingCodeGenerator>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            phase: AppPhase::Running,
            session: BotSession::new(),
            activity: ActivityLog::new(),
            simulator: MessageSimulator::from_settings(&settings.simulator),
            settings,
            pairing_codes: Arc::new(RandomPairingCodes),
        }
    }

    /// Replace the pairing code source
    pub fn with_pairing_codes(mut self, generator: Arc<dyn PairingCodeGenerator>) -> Self {
        self.pairing_codes = generator;
        self
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    /// Read-only projection for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, self.activity.snapshot())
    }
}
