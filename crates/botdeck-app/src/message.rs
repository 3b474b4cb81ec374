//! Message types for the application (TEA pattern)

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use botdeck_core::Result;

use crate::session::Generation;

/// Reply slot for the engine's verdict on a start request.
///
/// Clones share one slot; the first `send` answers and later ones are no-ops.
#[derive(Clone)]
pub struct StartReply(Arc<Mutex<Option<oneshot::Sender<Result<()>>>>>);

impl StartReply {
    /// Create a reply slot and the receiver that awaits the verdict
    pub fn channel() -> (Self, oneshot::Receiver<Result<()>>) {
        let (tx, rx) = oneshot::channel();
        (Self(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    /// Answer the request. A dropped receiver is ignored.
    pub fn send(&self, verdict: Result<()>) {
        let sender = match self.0.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(tx) = sender {
            let _ = tx.send(verdict);
        }
    }
}

impl fmt::Debug for StartReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StartReply")
    }
}

impl PartialEq for StartReply {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StartReply {}

/// All possible messages/actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Operator Commands
    // ─────────────────────────────────────────────────────────
    /// Start a session for a phone number. `reply`, when present, receives
    /// the verdict once the message is processed.
    StartBot {
        phone_number: String,
        reply: Option<StartReply>,
    },
    /// Stop the session from any state
    StopBot,
    /// Clear the processed-message counter
    ResetStats,

    // ─────────────────────────────────────────────────────────
    // Scheduled Transitions
    // ─────────────────────────────────────────────────────────
    /// Pairing delay elapsed for a start
    PairingDue { generation: Generation },
    /// Connect delay elapsed for a start
    ConnectDue { generation: Generation },
    /// Simulator period elapsed while connected
    SimulatorTick { generation: Generation },

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Shut down (stdin `quit`, signal handler)
    Quit,
}

impl Message {
    /// Operator start with no one waiting on the verdict
    pub fn start_bot(phone_number: impl Into<String>) -> Self {
        Message::StartBot {
            phone_number: phone_number.into(),
            reply: None,
        }
    }

    /// Generation a scheduled message was created for, if any
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Message::PairingDue { generation }
            | Message::ConnectDue { generation }
            | Message::SimulatorTick { generation } => Some(*generation),
            _ => None,
        }
    }
}
