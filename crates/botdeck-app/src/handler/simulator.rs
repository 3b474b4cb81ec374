//! Simulated inbound message ticks

use tracing::{debug, trace};

use crate::session::Generation;
use crate::state::AppState;

use super::UpdateResult;

/// One simulator period elapsed.
///
/// Counts and logs a catalog message only while connected in the tick's own
/// generation; ticks that arrive after a stop are dropped, never queued.
pub fn handle_simulator_tick(state: &mut AppState, generation: Generation) -> UpdateResult {
    if !state.session.record_inbound(generation) {
        debug!(
            generation,
            current = state.session.generation,
            status = %state.session.status,
            "Dropping simulator tick"
        );
        return UpdateResult::none();
    }

    let message = state.simulator.next_message().to_string();
    trace!(count = state.session.message_count, "Simulated inbound message");
    state.activity.info(message);
    UpdateResult::none()
}
