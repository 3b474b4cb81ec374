//! Main update function - handles state transitions (TEA pattern)

use crate::message::Message;
use crate::state::{AppPhase, AppState};
use tracing::info;

use super::{session_lifecycle, simulator, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        // ─────────────────────────────────────────────────────────
        // Operator Commands
        // ─────────────────────────────────────────────────────────
        Message::StartBot {
            phone_number,
            reply,
        } => {
            let (result, verdict) = session_lifecycle::handle_start(state, &phone_number);
            if let Some(reply) = reply {
                reply.send(verdict);
            }
            result
        }
        Message::StopBot => session_lifecycle::handle_stop(state),
        Message::ResetStats => session_lifecycle::handle_reset_stats(state),

        // ─────────────────────────────────────────────────────────
        // Scheduled Transitions
        // ─────────────────────────────────────────────────────────
        Message::PairingDue { generation } => {
            session_lifecycle::handle_pairing_due(state, generation)
        }
        Message::ConnectDue { generation } => {
            session_lifecycle::handle_connect_due(state, generation)
        }
        Message::SimulatorTick { generation } => {
            simulator::handle_simulator_tick(state, generation)
        }

        // ─────────────────────────────────────────────────────────
        // Lifecycle
        // ─────────────────────────────────────────────────────────
        Message::Quit => {
            info!("Quit requested");
            state.phase = AppPhase::Quitting;
            if state.session.status.is_running() {
                // Leave the session in a clean Idle state on the way out
                UpdateResult::message(Message::StopBot)
            } else {
                UpdateResult::none()
            }
        }
    }
}
