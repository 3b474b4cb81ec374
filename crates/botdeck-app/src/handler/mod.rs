//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `session_lifecycle`: start/stop and the scheduled connection transitions
//! - `simulator`: Simulated inbound message ticks

pub(crate) mod session_lifecycle;
pub(crate) mod simulator;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use std::time::Duration;

use crate::message::Message;
use crate::session::Generation;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Schedule the delayed `PairingDue` and `ConnectDue` messages for a
    /// start. Both delays are measured from the start, not chained.
    ScheduleConnection {
        generation: Generation,
        pairing_delay: Duration,
        connect_delay: Duration,
    },

    /// Start the periodic `SimulatorTick` producer for a connected session
    StartSimulator {
        generation: Generation,
        period: Duration,
    },

    /// Abort every task scheduled for a generation
    CancelGeneration { generation: Generation },

    /// Abort all scheduled tasks (shutdown)
    CancelAll,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
