//! Simulated inbound-event catalog

use rand::Rng;

use crate::config::SimulatorSettings;

/// Picks synthetic inbound-event messages while the session is connected
#[derive(Debug, Clone)]
pub struct MessageSimulator {
    catalog: Vec<String>,
    enabled: bool,
}

impl Default for MessageSimulator {
    fn default() -> Self {
        Self::from_settings(&SimulatorSettings::default())
    }
}

impl MessageSimulator {
    pub fn from_settings(settings: &SimulatorSettings) -> Self {
        Self {
            catalog: settings.catalog(),
            enabled: settings.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Uniformly random catalog entry
    pub fn next_message(&self) -> &str {
        let idx = rand::thread_rng().gen_range(0..self.catalog.len());
        &self.catalog[idx]
    }
}
