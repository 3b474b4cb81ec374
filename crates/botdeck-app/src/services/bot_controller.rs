//! Bot control operations
//!
//! `BotController` is the command surface for code outside the message loop.
//! Commands are forwarded as messages; the engine remains the only writer.

use std::sync::Arc;

use tokio::sync::mpsc;

use botdeck_core::prelude::*;

use super::state_service::SharedState;
use crate::message::{Message, StartReply};
use crate::session::SessionSnapshot;

/// Bot session control
#[trait_variant::make(BotController: Send)]
pub trait LocalBotController {
    /// Request a start and wait for the engine to process it.
    ///
    /// Returns `Validation` for a blank number and `AlreadyRunning` while a
    /// session is in progress. Either way the engine records the outcome in
    /// the activity log.
    async fn start(&self, phone_number: &str) -> Result<()>;

    /// Stop from any state
    async fn stop(&self) -> Result<()>;

    /// Clear the processed-message counter
    async fn reset_stats(&self) -> Result<()>;

    /// Latest synchronised session projection
    async fn snapshot(&self) -> SessionSnapshot;
}

/// Implementation that drives an `Engine` through its message channel
pub struct EngineBotController {
    msg_tx: mpsc::Sender<Message>,
    state: Arc<SharedState>,
}

impl EngineBotController {
    pub fn new(msg_tx: mpsc::Sender<Message>, state: Arc<SharedState>) -> Self {
        Self { msg_tx, state }
    }

    async fn send(&self, message: Message, what: &str) -> Result<()> {
        self.msg_tx
            .send(message)
            .await
            .map_err(|_| Error::channel_send(what))
    }
}

impl LocalBotController for EngineBotController {
    async fn start(&self, phone_number: &str) -> Result<()> {
        let (reply, verdict) = StartReply::channel();
        self.send(
            Message::StartBot {
                phone_number: phone_number.to_string(),
                reply: Some(reply),
            },
            "start command",
        )
        .await?;

        // Sender dropped unanswered: the engine shut down before processing
        verdict.await.unwrap_or(Err(Error::ChannelClosed))
    }

    async fn stop(&self) -> Result<()> {
        self.send(Message::StopBot, "stop command").await
    }

    async fn reset_stats(&self) -> Result<()> {
        self.send(Message::ResetStats, "reset command").await
    }

    async fn snapshot(&self) -> SessionSnapshot {
        self.state.session.read().await.clone()
    }
}
