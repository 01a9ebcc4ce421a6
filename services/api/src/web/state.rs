//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use daily_goals_core::ports::TrackerStore;
use daily_goals_core::service::TrackerService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Goal, subtask, session and streak operations.
    pub service: Arc<TrackerService>,
    /// Direct store access for the account and auth-session endpoints.
    pub db: Arc<dyn TrackerStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: TrackerService, config: Arc<Config>) -> Self {
        Self {
            db: service.store().clone(),
            service: Arc::new(service),
            config,
        }
    }
}
