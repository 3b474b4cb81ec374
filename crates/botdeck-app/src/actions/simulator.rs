//! Periodic simulator tick producer.
//!
//! One ticker runs per connected generation. The first tick fires one full
//! period after connecting; missed ticks are skipped rather than burst.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::message::Message;
use crate::session::Generation;

/// Spawn the ticker for a connected generation.
///
/// Runs until aborted by the scheduler, the engine shuts down, or the message
/// channel closes.
pub(crate) fn spawn_simulator_ticker(
    generation: Generation,
    period: Duration,
    msg_tx: mpsc::Sender<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(generation, ?period, "Simulator ticker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if msg_tx.send(Message::SimulatorTick { generation }).await.is_err() {
                        // Channel closed, engine is gone
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(generation, "Simulator ticker stopped");
    })
}
