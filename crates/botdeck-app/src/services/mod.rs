//! Service layer for botdeck
//!
//! Service traits for code that lives outside the engine's message loop
//! (the console runner, future remote front ends).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Console   │     │   Remote    │
//! └──────┬──────┘     └──────┬──────┘
//!        │                   │
//!        └─────────┬─────────┘
//!                  │
//!           ┌──────▼──────┐
//!           │  Services   │──── Message ───▶ Engine
//!           │  (traits)   │
//!           └──────┬──────┘
//!                  │
//!           ┌──────▼──────┐
//!           │ SharedState │
//!           │(Arc<RwLock>)│
//!           └─────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`SharedState`]: Session mirror synchronised by the Engine
//! - [`BotController`]: start/stop/reset commands
//! - [`StateService`]: Snapshot and activity queries

mod bot_controller;
mod state_service;

pub use bot_controller::{BotController, EngineBotController, LocalBotController};

pub use state_service::{LocalStateService, SharedState, SharedStateService, StateService};
