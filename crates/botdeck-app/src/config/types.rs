//! Configuration types for botdeck

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest delay accepted for a scheduled transition
pub const MIN_TRANSITION_DELAY_MS: u64 = 10;

/// Shortest simulator tick period accepted
pub const MIN_MESSAGE_INTERVAL_MS: u64 = 100;

/// Messages the simulator picks from when none are configured
pub const DEFAULT_SIMULATED_MESSAGES: &[&str] = &[
    "Message received from: +62812345678",
    "Auto reply sent",
    "Command processed: !help",
    "Group message received",
];

/// Application settings (.botdeck/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Delays of the simulated connection lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingSettings {
    /// Delay from `start` until the pairing code is issued
    #[serde(default = "default_pairing_delay_ms")]
    pub pairing_delay_ms: u64,

    /// Delay from `start` until the session reports connected
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,

    /// Period between simulated inbound messages while connected
    #[serde(default = "default_message_interval_ms")]
    pub message_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            pairing_delay_ms: default_pairing_delay_ms(),
            connect_delay_ms: default_connect_delay_ms(),
            message_interval_ms: default_message_interval_ms(),
        }
    }
}

impl TimingSettings {
    /// Pairing delay, clamped to [`MIN_TRANSITION_DELAY_MS`]
    pub fn pairing_delay(&self) -> Duration {
        Duration::from_millis(self.pairing_delay_ms.max(MIN_TRANSITION_DELAY_MS))
    }

    /// Connect delay, always later than the pairing delay.
    ///
    /// Both delays are measured from the `start` call, so a connect delay at
    /// or below the pairing delay is raised to pairing + the minimum step.
    pub fn connect_delay(&self) -> Duration {
        let pairing = self.pairing_delay_ms.max(MIN_TRANSITION_DELAY_MS);
        let floor = pairing + MIN_TRANSITION_DELAY_MS;
        Duration::from_millis(self.connect_delay_ms.max(floor))
    }

    /// Simulator period, clamped to [`MIN_MESSAGE_INTERVAL_MS`]
    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms.max(MIN_MESSAGE_INTERVAL_MS))
    }
}

/// Simulated inbound-event feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulatorSettings {
    /// If false, no ticks are produced while connected
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Catalog of messages; an empty list falls back to the defaults
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            messages: default_messages(),
        }
    }
}

impl SimulatorSettings {
    /// Non-empty catalog to draw from
    pub fn catalog(&self) -> Vec<String> {
        let messages: Vec<String> = self
            .messages
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if messages.is_empty() {
            default_messages()
        } else {
            messages
        }
    }
}

fn default_pairing_delay_ms() -> u64 {
    1000
}

fn default_connect_delay_ms() -> u64 {
    5000
}

fn default_message_interval_ms() -> u64 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_messages() -> Vec<String> {
    DEFAULT_SIMULATED_MESSAGES
        .iter()
        .map(|m| m.to_string())
        .collect()
}
