//! In-process hooks on the bot session.
//!
//! A plugin sees every operator command (`StartBot`, `StopBot`, `ResetStats`),
//! every scheduled `PairingDue`/`ConnectDue`/`SimulatorTick` that reached the
//! update loop, and the events those produced: status changes, pairing codes,
//! activity entries and counter changes. Typical uses are forwarding a fresh
//! pairing code to another channel or mirroring the activity log elsewhere.
//!
//! Plugins run synchronously on the engine loop. Consumers that only need
//! the events, and can run elsewhere, should use `Engine::subscribe()`.

use std::fmt;

use botdeck_core::prelude::*;

use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::state::AppState;

/// Session hook registered with `Engine::register_plugin()`.
///
/// All hooks default to no-ops. A hook error is logged with the plugin name
/// and the session carries on.
pub trait EnginePlugin: Send + Sync + fmt::Debug {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Once, before the console starts reading commands
    fn on_start(&self, _state: &AppState) -> Result<()> {
        Ok(())
    }

    /// After `msg` went through `update()`; `state` is the result.
    ///
    /// Stale timer messages arrive here too, with `state` unchanged.
    fn on_message(&self, _msg: &Message, _state: &AppState) -> Result<()> {
        Ok(())
    }

    /// For each event the message produced, in emission order
    fn on_event(&self, _event: &EngineEvent) -> Result<()> {
        Ok(())
    }

    /// On shutdown, before pending timers are aborted
    fn on_shutdown(&self) -> Result<()> {
        Ok(())
    }
}
