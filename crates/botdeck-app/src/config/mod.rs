//! Configuration file parsing for botdeck
//!
//! Supports `.botdeck/config.toml` under the chosen config directory.

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, save_settings};
pub use types::*;
