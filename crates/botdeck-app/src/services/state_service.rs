//! Shared state management for concurrent access
//!
//! A read-only mirror of the session, synchronised by the Engine after each
//! processed message, for consumers that live outside the message loop.

use std::sync::Arc;

use tokio::sync::RwLock;

use botdeck_core::LogEntry;

use crate::session::SessionSnapshot;

/// Centralized shared state for service consumers
#[derive(Debug, Default)]
pub struct SharedState {
    /// Latest session projection, activity entries included
    pub session: Arc<RwLock<SessionSnapshot>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// StateService trait for querying session state
#[trait_variant::make(StateService: Send)]
pub trait LocalStateService {
    /// Full session projection
    async fn snapshot(&self) -> SessionSnapshot;

    /// Activity entries, oldest first
    async fn activity(&self) -> Vec<LogEntry>;
}

/// Default implementation using SharedState
pub struct SharedStateService {
    state: Arc<SharedState>,
}

impl SharedStateService {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }
}

impl LocalStateService for SharedStateService {
    async fn snapshot(&self) -> SessionSnapshot {
        self.state.session.read().await.clone()
    }

    async fn activity(&self) -> Vec<LogEntry> {
        self.state.session.read().await.log_entries.clone()
    }
}
