//! Action handlers: UpdateAction dispatch and background task spawning

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::handler::UpdateAction;
use crate::message::Message;
use crate::session::Generation;

pub(crate) mod schedule;
pub(crate) mod simulator;

/// Background timer tasks, keyed by the session generation that owns them.
///
/// Cloning shares the same map. Cancelling a generation aborts every task it
/// owns so no late message is ever produced for it.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    tasks: Arc<Mutex<HashMap<Generation, Vec<JoinHandle<()>>>>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a spawned task under its generation
    pub fn register(&self, generation: Generation, handle: JoinHandle<()>) {
        match self.tasks.lock() {
            Ok(mut tasks) => {
                prune_finished(&mut tasks);
                tasks.entry(generation).or_default().push(handle);
            }
            Err(e) => {
                warn!("Task map poisoned, aborting untracked task: {}", e);
                handle.abort();
            }
        }
    }

    /// Abort every task owned by `generation`. Returns how many were aborted.
    pub fn cancel_generation(&self, generation: Generation) -> usize {
        let handles = match self.tasks.lock() {
            Ok(mut tasks) => tasks.remove(&generation).unwrap_or_default(),
            Err(e) => {
                warn!("Task map poisoned during cancel: {}", e);
                return 0;
            }
        };
        abort_all(generation, handles)
    }

    /// Abort every tracked task
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain().collect(),
            Err(e) => {
                warn!("Task map poisoned during shutdown: {}", e);
                return 0;
            }
        };
        drained
            .into_iter()
            .map(|(generation, handles)| abort_all(generation, handles))
            .sum()
    }

    /// Number of tracked tasks that have not finished yet
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .map(|tasks| {
                tasks
                    .values()
                    .flatten()
                    .filter(|handle| !handle.is_finished())
                    .count()
            })
            .unwrap_or(0)
    }
}

fn prune_finished(tasks: &mut HashMap<Generation, Vec<JoinHandle<()>>>) {
    tasks.retain(|_, handles| {
        handles.retain(|handle| !handle.is_finished());
        !handles.is_empty()
    });
}

fn abort_all(generation: Generation, handles: Vec<JoinHandle<()>>) -> usize {
    let count = handles.len();
    for handle in handles {
        handle.abort();
    }
    if count > 0 {
        debug!(generation, count, "Cancelled scheduled tasks");
    }
    count
}

/// Execute an action by spawning or cancelling background tasks
pub fn handle_action(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    scheduler: &TaskScheduler,
    shutdown_rx: watch::Receiver<bool>,
) {
    match action {
        UpdateAction::ScheduleConnection {
            generation,
            pairing_delay,
            connect_delay,
        } => {
            let pairing = schedule::spawn_delayed(
                pairing_delay,
                Message::PairingDue { generation },
                msg_tx.clone(),
                shutdown_rx.clone(),
            );
            scheduler.register(generation, pairing);

            let connect = schedule::spawn_delayed(
                connect_delay,
                Message::ConnectDue { generation },
                msg_tx,
                shutdown_rx,
            );
            scheduler.register(generation, connect);
        }

        UpdateAction::StartSimulator { generation, period } => {
            let ticker = simulator::spawn_simulator_ticker(generation, period, msg_tx, shutdown_rx);
            scheduler.register(generation, ticker);
        }

        UpdateAction::CancelGeneration { generation } => {
            scheduler.cancel_generation(generation);
        }

        UpdateAction::CancelAll => {
            scheduler.cancel_all();
        }
    }
}
