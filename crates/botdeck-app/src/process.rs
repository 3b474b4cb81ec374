//! Message processing
//!
//! Runs the TEA update function and dispatches the resulting actions,
//! following up on chained messages until the cycle settles.

use tokio::sync::{mpsc, watch};

use crate::actions::{handle_action, TaskScheduler};
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    scheduler: &TaskScheduler,
    shutdown_rx: &watch::Receiver<bool>,
) {
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, msg_tx.clone(), scheduler, shutdown_rx.clone());
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
