//! Engine - shared orchestration state for the console runners
//!
//! The Engine owns the application state (settings included), the message
//! channel, the timer task scheduler and the shutdown signal. Every state
//! change goes through `process_message`, one message at a time.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use botdeck_core::{Error, PairingCode, PairingCodeGenerator, Result, SessionStatus};

use crate::actions::TaskScheduler;
use crate::config::{self, Settings};
use crate::engine_event::EngineEvent;
use crate::message::{Message, StartReply};
use crate::plugin::EnginePlugin;
use crate::process;
use crate::services::{EngineBotController, SharedState, SharedStateService};
use crate::session::{Generation, SessionSnapshot};
use crate::signals;
use crate::state::AppState;

/// Message channel capacity
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Broadcast buffer for engine events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit appropriate EngineEvents.
#[derive(Debug, Clone)]
struct StateSnapshot {
    status: SessionStatus,
    generation: Generation,
    pairing_code: Option<PairingCode>,
    message_count: u64,
    last_log_seq: Option<u64>,
}

impl StateSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            status: state.session.status,
            generation: state.session.generation,
            pairing_code: state.session.pairing_code.clone(),
            message_count: state.session.message_count,
            last_log_seq: state.activity.last_seq(),
        }
    }
}

/// Orchestration engine for botdeck.
///
/// Encapsulates:
/// - TEA state management
/// - Message channel
/// - Generation-keyed timer tasks
/// - Shutdown signaling
/// - Shared state for the service layer
/// - Event broadcasting and plugins for external consumers
pub struct Engine {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (signal handler, stdin, timers).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Timer and ticker tasks, keyed by session generation
    pub scheduler: TaskScheduler,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,

    /// Receiver for the shutdown signal. Clone for background tasks.
    pub shutdown_rx: watch::Receiver<bool>,

    /// Session mirror for service consumers, synchronised after each message
    shared_state: Arc<SharedState>,

    /// Event broadcaster for external consumers
    event_tx: broadcast::Sender<EngineEvent>,

    /// Registered plugins, called in registration order
    plugins: Vec<Box<dyn EnginePlugin>>,
}

impl Engine {
    /// Create an Engine configured from `<config_dir>/.botdeck/config.toml`.
    ///
    /// Writes a default config file when none exists, then spawns the OS
    /// signal handler. Must be called inside a tokio runtime.
    pub fn new(config_dir: PathBuf) -> Self {
        // Non-fatal: defaults are used if the directory can't be written
        if let Err(e) = config::init_config_dir(&config_dir) {
            warn!("Failed to initialize .botdeck directory: {}", e);
        }

        let settings = config::load_settings(&config_dir);
        let engine = Self::with_settings(settings);

        signals::spawn_signal_handler(engine.msg_tx.clone());

        engine
    }

    /// Create an Engine from explicit settings, without touching disk or
    /// installing signal handlers
    pub fn with_settings(settings: Settings) -> Self {
        debug!(?settings, "Engine created");
        let state = AppState::with_settings(settings);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state,
            msg_tx,
            msg_rx,
            scheduler: TaskScheduler::new(),
            shutdown_tx,
            shutdown_rx,
            shared_state: Arc::new(SharedState::new()),
            event_tx,
            plugins: Vec::new(),
        }
    }

    /// Replace the pairing code source
    pub fn with_pairing_codes(mut self, generator: Arc<dyn PairingCodeGenerator>) -> Self {
        self.state.pairing_codes = generator;
        self
    }

    /// Subscribe to engine events.
    ///
    /// If the subscriber falls behind (buffer full), older events are
    /// dropped. Use `broadcast::error::RecvError::Lagged` to detect this.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Process a single message through the TEA update cycle.
    ///
    /// Emits EngineEvents for whatever changed, keeps SharedState in sync and
    /// notifies plugins.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        process::process_message(
            &mut self.state,
            msg.clone(),
            &self.msg_tx,
            &self.scheduler,
            &self.shutdown_rx,
        );

        let post = StateSnapshot::capture(&self.state);

        self.sync_shared_state_nonblocking();
        self.emit_events(&pre, &post);
        self.notify_plugins_message(&msg);
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Start a session.
    ///
    /// The attempt is always recorded in the activity log; a blank number or
    /// a session already in progress is also reported to the caller.
    pub fn start(&mut self, phone_number: &str) -> Result<()> {
        let (reply, mut verdict) = StartReply::channel();
        self.process_message(Message::StartBot {
            phone_number: phone_number.to_string(),
            reply: Some(reply),
        });
        verdict.try_recv().unwrap_or(Err(Error::ChannelClosed))
    }

    /// Stop the session from any state
    pub fn stop(&mut self) {
        self.process_message(Message::StopBot);
    }

    /// Clear the processed-message counter
    pub fn reset_stats(&mut self) {
        self.process_message(Message::ResetStats);
    }

    /// Read-only projection of the current session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Synchronize AppState changes to SharedState (non-blocking).
    ///
    /// One-way: AppState is the source of truth. If a service consumer holds
    /// the lock, this cycle is skipped and the next one catches up.
    fn sync_shared_state_nonblocking(&self) {
        if let Ok(mut session) = self.shared_state.session.try_write() {
            *session = self.state.snapshot();
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Get a clone of the shutdown receiver for background tasks.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Get a BotController that drives this engine through its channel.
    pub fn bot_controller(&self) -> EngineBotController {
        EngineBotController::new(self.msg_tx.clone(), self.shared_state.clone())
    }

    /// Get access to the shared state service.
    pub fn state_service(&self) -> SharedStateService {
        SharedStateService::new(self.shared_state.clone())
    }

    /// Get a reference to the shared state (for custom consumers).
    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.shared_state
    }

    // ─────────────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────────────

    /// Register a plugin. Plugins are called in registration order.
    pub fn register_plugin(&mut self, plugin: Box<dyn EnginePlugin>) {
        info!("Registered engine plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Call `on_start` on every plugin. Runners call this before their loop.
    pub fn notify_plugins_start(&self) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_start(&self.state) {
                warn!("Plugin {} on_start failed: {}", plugin.name(), e);
            }
        }
    }

    fn notify_plugins_message(&self, msg: &Message) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_message(msg, &self.state) {
                warn!("Plugin {} on_message failed: {}", plugin.name(), e);
            }
        }
    }

    /// Initiate shutdown: notify plugins, signal and abort background tasks.
    pub async fn shutdown(&mut self) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_shutdown() {
                warn!("Plugin {} on_shutdown failed: {}", plugin.name(), e);
            }
        }

        self.emit(EngineEvent::Shutdown);

        // Signal all background tasks to stop
        let _ = self.shutdown_tx.send(true);

        let aborted = self.scheduler.cancel_all();
        info!(aborted, "Engine shut down");
    }

    /// Emit EngineEvents based on state changes after processing.
    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        if pre.status != post.status {
            self.emit(EngineEvent::StatusChanged {
                generation: post.generation,
                old_status: pre.status,
                new_status: post.status,
            });
        }

        if pre.pairing_code != post.pairing_code {
            match &post.pairing_code {
                Some(code) => self.emit(EngineEvent::PairingCodeIssued { code: code.clone() }),
                None => self.emit(EngineEvent::PairingCodeCleared),
            }
        }

        if pre.last_log_seq != post.last_log_seq {
            for entry in self.state.activity.entries_since(pre.last_log_seq) {
                self.emit(EngineEvent::LogEntry { entry });
            }
        }

        if pre.message_count != post.message_count {
            self.emit(EngineEvent::MessageCountChanged {
                count: post.message_count,
            });
        }
    }

    /// Emit a single EngineEvent to all subscribers and plugins.
    ///
    /// send() returns Err only if there are no receivers, which is fine.
    fn emit(&self, event: EngineEvent) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_event(&event) {
                warn!("Plugin {} on_event failed: {}", plugin.name(), e);
            }
        }
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use botdeck_core::{FixedPairingCode, Severity};

    use crate::config::{SimulatorSettings, TimingSettings};
    use crate::services::{LocalBotController, LocalStateService};

    const PAIRING_MS: u64 = 100;
    const CONNECT_MS: u64 = 300;
    const INTERVAL_MS: u64 = 200;

    fn fast_settings() -> Settings {
        Settings {
            timing: TimingSettings {
                pairing_delay_ms: PAIRING_MS,
                connect_delay_ms: CONNECT_MS,
                message_interval_ms: INTERVAL_MS,
            },
            simulator: SimulatorSettings::default(),
        }
    }

    fn test_engine() -> Engine {
        Engine::with_settings(fast_settings()).with_pairing_codes(Arc::new(
            FixedPairingCode::new(PairingCode::parse("ABCD2345").unwrap()),
        ))
    }

    /// Let timers fire, then apply whatever they sent
    async fn advance(engine: &mut Engine, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
        engine.drain_pending_messages();
    }

    fn drain_events(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_engine_new_creates_config_and_idle_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(dir.path().to_path_buf());

        assert!(!engine.should_quit());
        assert_eq!(engine.snapshot().status, SessionStatus::Idle);
        assert!(config::config_path(dir.path()).exists());
        assert_eq!(engine.state.settings, Settings::default());
    }

    #[tokio::test]
    async fn test_engine_drain_empty_channel() {
        let mut engine = test_engine();
        assert_eq!(engine.drain_pending_messages(), 0);
    }

    #[tokio::test]
    async fn test_engine_process_quit_message() {
        let mut engine = test_engine();
        engine.process_message(Message::Quit);
        assert!(engine.should_quit());
    }

    #[tokio::test]
    async fn test_start_rejects_blank_number() {
        let mut engine = test_engine();

        let err = engine.start("   ").unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert_eq!(snapshot.log_entries.len(), 1);
        assert_eq!(snapshot.log_entries[0].severity, Severity::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_lifecycle_in_order() {
        let mut engine = test_engine();

        engine.start("6281234567").unwrap();
        assert_eq!(engine.snapshot().status, SessionStatus::Starting);
        assert!(engine.snapshot().pairing_code.is_none());

        advance(&mut engine, PAIRING_MS + 1).await;
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::PairingIssued);
        assert_eq!(snapshot.pairing_code.unwrap().as_str(), "ABCD2345");

        advance(&mut engine, CONNECT_MS - PAIRING_MS).await;
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Connected);
        assert!(snapshot.online);
        assert!(snapshot.pairing_code.is_some());

        engine.stop();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.pairing_code.is_none());

        let severities: Vec<_> = snapshot.log_entries.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Info,
                Severity::Success,
                Severity::Success,
                Severity::Warning
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_right_after_start_prevents_transitions() {
        let mut engine = test_engine();

        engine.start("6281234567").unwrap();
        engine.stop();
        assert_eq!(engine.scheduler.active_count(), 0);

        advance(&mut engine, CONNECT_MS * 3).await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.pairing_code.is_none());
        assert_eq!(snapshot.log_entries.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_between_pairing_and_connect() {
        let mut engine = test_engine();

        engine.start("6281234567").unwrap();
        advance(&mut engine, PAIRING_MS + 1).await;
        assert_eq!(engine.snapshot().status, SessionStatus::PairingIssued);

        engine.stop();
        advance(&mut engine, CONNECT_MS * 3).await;

        assert_eq!(engine.snapshot().status, SessionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connected_counts_one_message_per_period() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();
        advance(&mut engine, CONNECT_MS + 1).await;
        assert_eq!(engine.snapshot().status, SessionStatus::Connected);
        let before = engine.snapshot().message_count;

        advance(&mut engine, INTERVAL_MS * 3 + 1).await;

        assert_eq!(engine.snapshot().message_count, before + 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_message_count() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();
        advance(&mut engine, CONNECT_MS + 1).await;
        advance(&mut engine, INTERVAL_MS * 2 + 1).await;
        let count = engine.snapshot().message_count;
        assert_eq!(count, 2);

        engine.stop();
        advance(&mut engine, INTERVAL_MS * 5).await;

        assert_eq!(engine.snapshot().message_count, count);
        assert_eq!(engine.scheduler.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_uses_fresh_timers() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();
        advance(&mut engine, PAIRING_MS / 2).await;
        engine.stop();

        engine.start("6281234567").unwrap();
        // The first run's pairing deadline passes without effect
        advance(&mut engine, PAIRING_MS / 2 + 1).await;
        assert_eq!(engine.snapshot().status, SessionStatus::Starting);

        advance(&mut engine, PAIRING_MS / 2).await;
        assert_eq!(engine.snapshot().status, SessionStatus::PairingIssued);
    }

    #[tokio::test]
    async fn test_start_while_running_is_rejected() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();
        let generation = engine.snapshot().generation;

        let err = engine.start("6281234567").unwrap_err();

        assert!(matches!(err, Error::AlreadyRunning { .. }));
        assert_eq!(engine.snapshot().generation, generation);
        assert_eq!(engine.scheduler.active_count(), 2);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_subscribe_receives_lifecycle_events() {
        let mut engine = test_engine();
        let mut rx = engine.subscribe();

        engine.start("6281234567").unwrap();
        let events = drain_events(&mut rx);
        assert!(matches!(
            events[0],
            EngineEvent::StatusChanged {
                old_status: SessionStatus::Idle,
                new_status: SessionStatus::Starting,
                ..
            }
        ));
        assert!(matches!(events[1], EngineEvent::LogEntry { .. }));
        assert_eq!(events.len(), 2);

        let generation = engine.snapshot().generation;
        engine.process_message(Message::PairingDue { generation });
        let types: Vec<_> = drain_events(&mut rx).iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["status_changed", "pairing_code_issued", "log_entry"]);

        engine.process_message(Message::ConnectDue { generation });
        engine.process_message(Message::SimulatorTick { generation });
        let types: Vec<_> = drain_events(&mut rx).iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["status_changed", "log_entry", "log_entry", "message_count_changed"]
        );

        engine.stop();
        let types: Vec<_> = drain_events(&mut rx).iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["status_changed", "pairing_code_cleared", "log_entry"]);
    }

    #[tokio::test]
    async fn test_subscribe_receives_shutdown_event() {
        let mut engine = test_engine();
        let mut rx = engine.subscribe();

        engine.shutdown().await;

        match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
            Ok(Ok(event)) => assert!(matches!(event, EngineEvent::Shutdown)),
            _ => panic!("Should have received shutdown event"),
        }
        assert!(*engine.shutdown_receiver().borrow());
    }

    #[tokio::test]
    async fn test_no_subscribers_no_error() {
        let mut engine = test_engine();
        engine.process_message(Message::Quit);
    }

    #[tokio::test]
    async fn test_shared_state_synced_after_message() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();

        let service = engine.state_service();
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Starting);
        assert_eq!(service.activity().await.len(), 1);
        engine.shutdown().await;
    }

    /// Run the engine loop until a controller call has its answer
    async fn settle<T>(engine: &mut Engine, task: tokio::task::JoinHandle<T>) -> T {
        while !task.is_finished() {
            tokio::task::yield_now().await;
            engine.drain_pending_messages();
        }
        task.await.unwrap()
    }

    #[tokio::test]
    async fn test_bot_controller_drives_engine() {
        let mut engine = test_engine();
        let controller = engine.bot_controller();

        let started = tokio::spawn(async move {
            let verdict = controller.start("6281234567").await;
            controller.reset_stats().await.unwrap();
            (controller, verdict)
        });
        let (controller, verdict) = settle(&mut engine, started).await;
        engine.drain_pending_messages();

        verdict.unwrap();
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Starting);
        assert_eq!(snapshot.log_entries.len(), 2);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_bot_controller_queued_starts_get_engine_verdicts() {
        let mut engine = test_engine();
        let first = engine.bot_controller();
        let second = engine.bot_controller();

        // Both requests are queued before the engine sees either one
        let first = tokio::spawn(async move { first.start("6281234567").await });
        let second = tokio::spawn(async move { second.start("6281234567").await });
        let verdicts = vec![
            settle(&mut engine, first).await,
            settle(&mut engine, second).await,
        ];

        assert_eq!(verdicts.iter().filter(|v| v.is_ok()).count(), 1);
        assert_eq!(
            verdicts
                .iter()
                .filter(|v| matches!(v, Err(Error::AlreadyRunning { .. })))
                .count(),
            1
        );
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Starting);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.log_entries.last().unwrap().severity, Severity::Warning);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_bot_controller_start_after_queued_stop_is_accepted() {
        let mut engine = test_engine();
        engine.start("6281234567").unwrap();
        let controller = engine.bot_controller();

        // The stop is still in the channel when the start is requested
        let restart = tokio::spawn(async move {
            controller.stop().await.unwrap();
            controller.start("6289876543").await
        });
        let verdict = settle(&mut engine, restart).await;

        verdict.unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Starting);
        assert_eq!(snapshot.phone_number.as_deref(), Some("6289876543"));
        assert_eq!(engine.scheduler.active_count(), 2);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_bot_controller_blank_start_is_validation_error() {
        let mut engine = test_engine();
        let controller = engine.bot_controller();

        let blank = tokio::spawn(async move { controller.start("   ").await });
        let err = settle(&mut engine, blank).await.unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert_eq!(snapshot.log_entries[0].severity, Severity::Error);
    }

    #[test]
    fn test_state_snapshot_capture() {
        let state = AppState::new();
        let snapshot = StateSnapshot::capture(&state);

        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.last_log_seq, None);
        assert_eq!(snapshot.message_count, 0);
    }
}
