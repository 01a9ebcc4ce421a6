//! crates/daily_goals_core/src/service/mod.rs
//!
//! The goal/subtask/time-session service. Owns every business rule: the daily
//! goal cap, the per-goal subtask cap, ownership checks, position assignment,
//! the single-active-timer rule, time accumulation, streaks and the day reset.
//!
//! Callers pass an already-resolved user id; the identity gate lives in front
//! of the service, so no method here can run without a caller.

mod goals;
mod profile;
mod sessions;
mod stats;
mod streak;
mod subtasks;

pub use streak::DayReset;

use std::sync::Arc;

use crate::ports::{Clock, PortError, PortResult, ResetScheduler, TrackerStore};

#[derive(Clone)]
pub struct TrackerService {
    store: Arc<dyn TrackerStore>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn ResetScheduler>,
}

impl TrackerService {
    pub fn new(
        store: Arc<dyn TrackerStore>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn ResetScheduler>,
    ) -> Self {
        Self {
            store,
            clock,
            scheduler,
        }
    }

    pub fn store(&self) -> &Arc<dyn TrackerStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

/// Trims `value` and rejects it if nothing is left.
fn require_text(value: &str, field: &str) -> PortResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Next position after the highest existing one, starting at 0.
fn next_position(explicit: Option<i32>, max_existing: Option<i32>) -> i32 {
    explicit.unwrap_or_else(|| max_existing.unwrap_or(-1) + 1)
}
