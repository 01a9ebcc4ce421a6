//! Streak accounting and the end-of-day reset.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::TrackerService;
use crate::domain::{all_subtasks_completed, CompletionOutcome};
use crate::ports::{Clock, PortResult, TrackerStore};

impl TrackerService {
    /// Checks whether every subtask of every current goal is completed. If so,
    /// bumps the streak (at most once per calendar day) and schedules the reset.
    pub(crate) async fn record_completion(&self, user_id: Uuid) -> PortResult<CompletionOutcome> {
        let goals = self.store.list_goals(user_id).await?;
        if !all_subtasks_completed(&goals) {
            return Ok(CompletionOutcome::default());
        }

        self.ensure_profile(user_id).await?;
        let now = self.clock.now();
        let today = self.clock.local_date(now);
        let streak_incremented = self.store.increment_streak(user_id, today, now).await?;
        let streak_count = self
            .store
            .get_profile(user_id)
            .await?
            .map(|profile| profile.streak_count);

        if streak_incremented {
            info!(%user_id, ?streak_count, "All goals completed, streak incremented");
        } else {
            info!(%user_id, "All goals completed, streak already counted today");
        }

        self.scheduler.schedule(self.day_reset(user_id));

        Ok(CompletionOutcome {
            all_completed: true,
            streak_incremented,
            streak_count,
        })
    }

    /// Runs the day reset for the caller right away.
    pub async fn reset_day(&self, user_id: Uuid) -> PortResult<u64> {
        self.day_reset(user_id).run().await
    }

    fn day_reset(&self, user_id: Uuid) -> DayReset {
        DayReset {
            store: self.store.clone(),
            clock: self.clock.clone(),
            user_id,
        }
    }
}

/// A pending reset of one user's goal set: all subtasks back to not completed
/// with no time spent, all goals collapsed. It never completes anything, so it
/// cannot trigger a streak, and running it again changes nothing.
pub struct DayReset {
    store: Arc<dyn TrackerStore>,
    clock: Arc<dyn Clock>,
    user_id: Uuid,
}

impl DayReset {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub async fn run(self) -> PortResult<u64> {
        let touched = self
            .store
            .reset_day(self.user_id, self.clock.now())
            .await?;
        info!(user_id = %self.user_id, touched, "Daily goals reset");
        Ok(touched)
    }
}

impl std::fmt::Debug for DayReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayReset")
            .field("user_id", &self.user_id)
            .finish()
    }
}
