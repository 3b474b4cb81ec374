//! Settings parser for .botdeck/config.toml

use super::types::Settings;
use botdeck_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const BOTDECK_DIR: &str = ".botdeck";

/// Path of the settings file under `base_dir`
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(BOTDECK_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.botdeck/config.toml`
///
/// A missing file yields defaults. Unreadable or invalid files also yield
/// defaults, with a warning in the diagnostic log.
pub fn load_settings(base_dir: &Path) -> Settings {
    let config_path = config_path(base_dir);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Save settings to `.botdeck/config.toml`, creating the directory if needed
pub fn save_settings(base_dir: &Path, settings: &Settings) -> Result<()> {
    let dir = base_dir.join(BOTDECK_DIR);
    std::fs::create_dir_all(&dir).context("Failed to create .botdeck dir")?;

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let path = config_path(base_dir);
    std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

    Ok(())
}

/// Create a commented default config file if none exists
pub fn init_config_dir(base_dir: &Path) -> Result<()> {
    let dir = base_dir.join(BOTDECK_DIR);

    if !dir.exists() {
        std::fs::create_dir_all(&dir).context("Failed to create .botdeck dir")?;
    }

    let path = config_path(base_dir);
    if !path.exists() {
        let default_content = r#"# botdeck configuration

[timing]
pairing_delay_ms = 1000      # start -> pairing code issued
connect_delay_ms = 5000      # start -> connected (must exceed pairing delay)
message_interval_ms = 8000   # simulated inbound message period

[simulator]
enabled = true
messages = [
    "Message received from: +62812345678",
    "Auto reply sent",
    "Command processed: !help",
    "Group message received",
]
"#;
        std::fs::write(&path, default_content)
            .with_context(|| format!("Failed to write {:?}", path))?;
        info!("Created default config at {:?}", path);
    }

    Ok(())
}
