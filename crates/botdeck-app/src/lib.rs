//! botdeck-app - Session state machine and orchestration for botdeck
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the bot
//! session: `Message` in, `update()` mutates `AppState`, `UpdateAction` out.
//! The `Engine` wraps it with the message channel, the generation-keyed timer
//! tasks, event broadcasting, plugins and the service layer.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod plugin;
pub mod process;
pub mod services;
pub mod session;
pub mod signals;
pub mod simulator;
pub mod state;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use plugin::EnginePlugin;
pub use session::{BotSession, Generation, SessionSnapshot};
pub use state::{AppPhase, AppState};
