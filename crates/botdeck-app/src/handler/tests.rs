//! Tests for handler module

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::message::{Message, StartReply};
use crate::state::{AppPhase, AppState};
use botdeck_core::{Error, FixedPairingCode, PairingCode, SessionStatus, Severity};

fn test_code() -> PairingCode {
    PairingCode::parse("TEST1234").unwrap()
}

fn test_state() -> AppState {
    AppState::new().with_pairing_codes(Arc::new(FixedPairingCode::new(test_code())))
}

fn start(state: &mut AppState, phone: &str) -> UpdateResult {
    update(state, Message::start_bot(phone))
}

/// Drive a state through start, pairing and connect; returns the generation
fn connect(state: &mut AppState) -> u64 {
    start(state, "6281234567");
    let generation = state.session.generation;
    update(state, Message::PairingDue { generation });
    update(state, Message::ConnectDue { generation });
    assert_eq!(state.session.status, SessionStatus::Connected);
    generation
}

fn severities(state: &AppState) -> Vec<Severity> {
    state.activity.iter().map(|e| e.severity).collect()
}

// ─────────────────────────────────────────────────────────
// start
// ─────────────────────────────────────────────────────────

#[test]
fn test_start_with_empty_phone_logs_one_error() {
    for phone in ["", "   "] {
        let mut state = test_state();

        let result = start(&mut state, phone);

        assert!(result.action.is_none());
        assert_eq!(state.session.status, SessionStatus::Idle);
        assert_eq!(severities(&state), vec![Severity::Error]);
    }
}

#[test]
fn test_start_schedules_connection() {
    let mut state = test_state();

    let result = start(&mut state, "6281234567");

    assert_eq!(state.session.status, SessionStatus::Starting);
    assert_eq!(severities(&state), vec![Severity::Info]);
    assert_eq!(
        result.action,
        Some(UpdateAction::ScheduleConnection {
            generation: state.session.generation,
            pairing_delay: Duration::from_millis(1000),
            connect_delay: Duration::from_millis(5000),
        })
    );
}

#[test]
fn test_start_trims_phone_number() {
    let mut state = test_state();
    start(&mut state, "  6281234567 ");
    assert_eq!(state.session.phone_number, "6281234567");
}

#[test]
fn test_start_while_running_is_rejected_noop() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let generation = state.session.generation;

    let result = start(&mut state, "6299999999");

    assert!(result.action.is_none());
    assert_eq!(state.session.generation, generation);
    assert_eq!(state.session.phone_number, "6281234567");
    assert_eq!(state.session.status, SessionStatus::Starting);
    assert_eq!(severities(&state), vec![Severity::Info, Severity::Warning]);
}

#[test]
fn test_start_while_connected_is_rejected() {
    let mut state = test_state();
    connect(&mut state);
    let before = state.activity.len();

    let result = start(&mut state, "6281234567");

    assert!(result.action.is_none());
    assert_eq!(state.session.status, SessionStatus::Connected);
    assert_eq!(state.activity.len(), before + 1);
    assert!(state.activity.latest().unwrap().message.contains("connected"));
}

#[test]
fn test_start_reply_receives_applied_verdict() {
    let mut state = test_state();
    let (accepted, mut accepted_rx) = StartReply::channel();
    let (rejected, mut rejected_rx) = StartReply::channel();

    update(
        &mut state,
        Message::StartBot {
            phone_number: "6281234567".into(),
            reply: Some(accepted),
        },
    );
    update(
        &mut state,
        Message::StartBot {
            phone_number: "6281234567".into(),
            reply: Some(rejected),
        },
    );

    assert!(accepted_rx.try_recv().unwrap().is_ok());
    assert!(matches!(
        rejected_rx.try_recv().unwrap(),
        Err(Error::AlreadyRunning { .. })
    ));
}

// ─────────────────────────────────────────────────────────
// scheduled transitions
// ─────────────────────────────────────────────────────────

#[test]
fn test_pairing_due_issues_code() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let generation = state.session.generation;

    update(&mut state, Message::PairingDue { generation });

    assert_eq!(state.session.status, SessionStatus::PairingIssued);
    assert_eq!(state.session.pairing_code, Some(test_code()));
    let latest = state.activity.latest().unwrap();
    assert_eq!(latest.severity, Severity::Success);
    assert!(latest.message.contains("TEST1234"));
    assert!(latest.message.contains("Linked Devices"));
}

#[test]
fn test_connect_due_goes_online_and_starts_simulator() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let generation = state.session.generation;
    update(&mut state, Message::PairingDue { generation });

    let result = update(&mut state, Message::ConnectDue { generation });

    assert_eq!(state.session.status, SessionStatus::Connected);
    assert!(state.session.pairing_code.is_some());
    let latest = state.activity.latest().unwrap();
    assert_eq!(latest.severity, Severity::Success);
    assert!(latest.message.contains("6281234567"));
    assert_eq!(
        result.action,
        Some(UpdateAction::StartSimulator {
            generation,
            period: Duration::from_millis(8000),
        })
    );
}

#[test]
fn test_each_transition_appends_exactly_one_entry() {
    let mut state = test_state();

    start(&mut state, "6281234567");
    assert_eq!(state.activity.len(), 1);
    let generation = state.session.generation;
    update(&mut state, Message::PairingDue { generation });
    assert_eq!(state.activity.len(), 2);
    update(&mut state, Message::ConnectDue { generation });
    assert_eq!(state.activity.len(), 3);
    update(&mut state, Message::StopBot);
    assert_eq!(state.activity.len(), 4);
}

#[test]
fn test_connect_without_pairing_is_ignored() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let generation = state.session.generation;

    let result = update(&mut state, Message::ConnectDue { generation });

    assert!(result.action.is_none());
    assert_eq!(state.session.status, SessionStatus::Starting);
    assert_eq!(state.activity.len(), 1);
}

#[test]
fn test_simulator_disabled_does_not_start_ticker() {
    let mut settings = crate::config::Settings::default();
    settings.simulator.enabled = false;
    let mut state = AppState::with_settings(settings);
    start(&mut state, "6281234567");
    let generation = state.session.generation;
    update(&mut state, Message::PairingDue { generation });

    let result = update(&mut state, Message::ConnectDue { generation });

    assert_eq!(state.session.status, SessionStatus::Connected);
    assert!(result.action.is_none());
}

// ─────────────────────────────────────────────────────────
// stop
// ─────────────────────────────────────────────────────────

#[test]
fn test_stop_clears_code_and_cancels_generation() {
    let mut state = test_state();
    let generation = connect(&mut state);

    let result = update(&mut state, Message::StopBot);

    assert_eq!(state.session.status, SessionStatus::Idle);
    assert!(state.session.pairing_code.is_none());
    assert_eq!(state.activity.latest().unwrap().severity, Severity::Warning);
    assert_eq!(
        result.action,
        Some(UpdateAction::CancelGeneration { generation })
    );
}

#[test]
fn test_stop_from_idle_only_logs() {
    let mut state = test_state();

    let result = update(&mut state, Message::StopBot);

    assert_eq!(state.session.status, SessionStatus::Idle);
    assert_eq!(state.session.generation, 0);
    assert!(result.action.is_none());
    assert_eq!(severities(&state), vec![Severity::Warning]);
}

#[test]
fn test_repeated_stop_keeps_generation() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    update(&mut state, Message::StopBot);
    let generation = state.session.generation;

    let result = update(&mut state, Message::StopBot);

    assert_eq!(state.session.generation, generation);
    assert!(result.action.is_none());
    assert_eq!(state.activity.latest().unwrap().message, "Bot stopped");
}

#[test]
fn test_stale_callbacks_after_stop_are_discarded() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let generation = state.session.generation;
    update(&mut state, Message::StopBot);
    let logged = state.activity.len();

    update(&mut state, Message::PairingDue { generation });
    update(&mut state, Message::ConnectDue { generation });

    assert_eq!(state.session.status, SessionStatus::Idle);
    assert!(state.session.pairing_code.is_none());
    assert_eq!(state.activity.len(), logged);
}

#[test]
fn test_stale_callbacks_do_not_leak_into_new_run() {
    let mut state = test_state();
    start(&mut state, "6281234567");
    let old = state.session.generation;
    update(&mut state, Message::StopBot);
    start(&mut state, "6281234567");

    update(&mut state, Message::PairingDue { generation: old });

    assert_eq!(state.session.status, SessionStatus::Starting);
}

// ─────────────────────────────────────────────────────────
// simulator ticks and counter
// ─────────────────────────────────────────────────────────

#[test]
fn test_tick_counts_and_logs_while_connected() {
    let mut state = test_state();
    let generation = connect(&mut state);

    for n in 1..=3 {
        update(&mut state, Message::SimulatorTick { generation });
        assert_eq!(state.session.message_count, n);
        let latest = state.activity.latest().unwrap();
        assert_eq!(latest.severity, Severity::Info);
        assert!(state
            .simulator
            .catalog()
            .iter()
            .any(|m| *m == latest.message));
    }
}

#[test]
fn test_tick_after_stop_is_dropped() {
    let mut state = test_state();
    let generation = connect(&mut state);
    update(&mut state, Message::SimulatorTick { generation });
    update(&mut state, Message::StopBot);
    let logged = state.activity.len();

    update(&mut state, Message::SimulatorTick { generation });

    assert_eq!(state.session.message_count, 1);
    assert_eq!(state.activity.len(), logged);
}

#[test]
fn test_counter_persists_across_restart_until_reset() {
    let mut state = test_state();
    let generation = connect(&mut state);
    update(&mut state, Message::SimulatorTick { generation });
    update(&mut state, Message::SimulatorTick { generation });
    update(&mut state, Message::StopBot);

    connect(&mut state);
    assert_eq!(state.session.message_count, 2);

    update(&mut state, Message::ResetStats);
    assert_eq!(state.session.message_count, 0);
    assert_eq!(state.activity.latest().unwrap().severity, Severity::Info);
}

// ─────────────────────────────────────────────────────────
// quit
// ─────────────────────────────────────────────────────────

#[test]
fn test_quit_while_idle() {
    let mut state = test_state();

    let result = update(&mut state, Message::Quit);

    assert_eq!(state.phase, AppPhase::Quitting);
    assert!(state.should_quit());
    assert!(result.message.is_none());
}

#[test]
fn test_quit_while_running_stops_session() {
    let mut state = test_state();
    connect(&mut state);

    let result = update(&mut state, Message::Quit);

    assert!(state.should_quit());
    assert_eq!(result.message, Some(Message::StopBot));
}

#[test]
fn test_activity_log_stays_bounded_under_ticks() {
    let mut state = test_state();
    let generation = connect(&mut state);

    for _ in 0..200 {
        update(&mut state, Message::SimulatorTick { generation });
    }

    assert_eq!(state.session.message_count, 200);
    assert_eq!(state.activity.len(), botdeck_core::ACTIVITY_LOG_CAPACITY);
}
