//! Session lifecycle handlers
//!
//! The connection state machine: `Idle -> Starting -> PairingIssued ->
//! Connected`, with `stop` returning to `Idle` from anywhere. Every accepted
//! transition appends exactly one activity entry.

use botdeck_core::{Error, Result, SessionStatus};
use tracing::{debug, info};

use crate::session::Generation;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

/// Shown with the pairing code so the operator knows where to enter it
pub(crate) const LINK_INSTRUCTIONS: &str =
    "Enter it in the app: Settings > Linked Devices > Link a Device > Link with phone number";

/// Handle an operator `start`.
///
/// Returns the update plus the verdict for whoever asked: `Ok` once the
/// session is `Starting`, otherwise the rejection that was logged.
pub fn handle_start(state: &mut AppState, phone_number: &str) -> (UpdateResult, Result<()>) {
    match state.session.begin(phone_number) {
        Ok(generation) => {
            info!(generation, "Session starting");
            state.activity.info("Starting bot...");
            let timing = &state.settings.timing;
            let result = UpdateResult::action(UpdateAction::ScheduleConnection {
                generation,
                pairing_delay: timing.pairing_delay(),
                connect_delay: timing.connect_delay(),
            });
            (result, Ok(()))
        }
        Err(e) => {
            match &e {
                Error::Validation { .. } => state.activity.error("Enter a phone number first!"),
                Error::AlreadyRunning { status } => state
                    .activity
                    .warning(format!("Bot is already running ({status}); stop it first")),
                other => state.activity.error(other.to_string()),
            };
            (UpdateResult::none(), Err(e))
        }
    }
}

/// Handle an operator `stop`. Valid from any state; from `Idle` it only logs.
pub fn handle_stop(state: &mut AppState) -> UpdateResult {
    let was = state.session.status;
    let stopped = state.session.stop();
    state.activity.warning("Bot stopped");

    match stopped {
        Some(generation) => {
            info!(from = %was, generation, "Session stopped");
            UpdateResult::action(UpdateAction::CancelGeneration { generation })
        }
        None => {
            debug!("Stop while idle");
            UpdateResult::none()
        }
    }
}

/// Pairing delay elapsed: issue a code
pub fn handle_pairing_due(state: &mut AppState, generation: Generation) -> UpdateResult {
    if !state.session.is_current(generation) || state.session.status != SessionStatus::Starting {
        debug!(
            generation,
            current = state.session.generation,
            status = %state.session.status,
            "Discarding stale pairing callback"
        );
        return UpdateResult::none();
    }

    let code = state.pairing_codes.generate();
    if state.session.issue_pairing_code(generation, code.clone()) {
        info!(generation, "Pairing code issued");
        state.activity.success(format!(
            "Pairing code generated: {code}. {}",
            LINK_INSTRUCTIONS
        ));
    }
    UpdateResult::none()
}

/// Connect delay elapsed: go online and start the simulator
pub fn handle_connect_due(state: &mut AppState, generation: Generation) -> UpdateResult {
    if !state.session.connect(generation) {
        debug!(
            generation,
            current = state.session.generation,
            status = %state.session.status,
            "Discarding stale connect callback"
        );
        return UpdateResult::none();
    }

    info!(generation, "Session connected");
    let phone_number = state.session.phone_number.clone();
    state.activity.success(format!(
        "Bot connected successfully. Active number: {phone_number}"
    ));

    if !state.simulator.is_enabled() {
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::StartSimulator {
        generation,
        period: state.settings.timing.message_interval(),
    })
}

/// Clear the processed-message counter
pub fn handle_reset_stats(state: &mut AppState) -> UpdateResult {
    state.session.reset_message_count();
    state.activity.info("Message counter reset");
    UpdateResult::none()
}
