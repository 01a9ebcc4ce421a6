//! Goal operations.

use tracing::{info, warn};
use uuid::Uuid;

use super::{next_position, require_text, TrackerService};
use crate::domain::{Goal, GoalPatch, GoalWithSubtasks, NewGoal, MAX_GOALS_PER_DAY};
use crate::ports::{PortError, PortResult};

impl TrackerService {
    /// All goals of the caller with their subtasks, ordered by position.
    pub async fn list_goals(&self, user_id: Uuid) -> PortResult<Vec<GoalWithSubtasks>> {
        self.store.list_goals(user_id).await
    }

    pub async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<GoalWithSubtasks> {
        self.store.get_goal(user_id, goal_id).await
    }

    /// Creates a goal unless the caller already created the daily maximum today.
    pub async fn create_goal(
        &self,
        user_id: Uuid,
        title: &str,
        position: Option<i32>,
    ) -> PortResult<Goal> {
        let title = require_text(title, "title")?;
        let now = self.clock.now();
        let day_start = self.clock.start_of_day(now);

        let created_today = self
            .store
            .count_goals_created_since(user_id, day_start)
            .await?;
        if created_today >= MAX_GOALS_PER_DAY {
            warn!(%user_id, created_today, "Daily goal limit reached");
            return Err(PortError::daily_goal_limit());
        }

        // Goals reference the profile, so make sure it exists first.
        self.ensure_profile(user_id).await?;

        let max_position = self.store.max_goal_position(user_id).await?;
        let new_goal = NewGoal {
            user_id,
            title,
            position: next_position(position, max_position),
            created_at: now,
        };
        let goal = self
            .store
            .insert_goal(new_goal, day_start, MAX_GOALS_PER_DAY)
            .await?;
        info!(%user_id, goal_id = %goal.id, position = goal.position, "Goal created");
        Ok(goal)
    }

    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        mut patch: GoalPatch,
    ) -> PortResult<Goal> {
        if let Some(title) = patch.title.as_deref() {
            patch.title = Some(require_text(title, "title")?);
        }
        self.store
            .update_goal(user_id, goal_id, &patch, self.clock.now())
            .await
    }

    /// Deletes the goal; its subtasks and their sessions go with it.
    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<()> {
        self.store.delete_goal(user_id, goal_id).await?;
        info!(%user_id, %goal_id, "Goal deleted");
        Ok(())
    }
}
