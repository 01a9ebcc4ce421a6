//! Time summary over the caller's current goals.

use uuid::Uuid;

use super::TrackerService;
use crate::domain::{GoalTimeSummary, TimeSummary};
use crate::ports::PortResult;

impl TrackerService {
    pub async fn time_summary(&self, user_id: Uuid) -> PortResult<TimeSummary> {
        let goals = self.store.list_goals(user_id).await?;

        let summaries: Vec<GoalTimeSummary> = goals
            .iter()
            .map(|g| GoalTimeSummary {
                goal_id: g.goal.id,
                title: g.goal.title.clone(),
                time_spent_seconds: g.total_time_spent(),
                completed_tasks: g.subtasks.iter().filter(|s| s.completed).count(),
                total_tasks: g.subtasks.len(),
                completion_rate: g.progress(),
            })
            .collect();

        Ok(TimeSummary {
            total_time_seconds: summaries
                .iter()
                .fold(0i64, |total, s| total.saturating_add(s.time_spent_seconds)),
            total_completed: summaries.iter().map(|s| s.completed_tasks).sum(),
            total_tasks: summaries.iter().map(|s| s.total_tasks).sum(),
            goals: summaries,
        })
    }
}
