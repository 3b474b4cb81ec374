//! One-shot delayed messages for the connection handshake

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::message::Message;

/// Spawn a task that sends `message` once `delay` has elapsed.
///
/// The task gives up silently if the engine shuts down first or the message
/// channel is already closed.
pub(crate) fn spawn_delayed(
    delay: Duration,
    message: Message,
    msg_tx: mpsc::Sender<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                trace!(?message, "Scheduled message due");
                let _ = msg_tx.send(message).await;
            }
            _ = shutdown_rx.changed() => {
                trace!(?message, "Scheduled message dropped on shutdown");
            }
        }
    })
}
