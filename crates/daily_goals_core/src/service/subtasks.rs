//! Subtask operations. Ownership always goes through the parent goal.

use tracing::{error, info, warn};
use uuid::Uuid;

use super::{next_position, require_text, TrackerService};
use crate::domain::{
    CompletionOutcome, NewSubTask, SubTask, SubTaskPatch, MAX_SUBTASKS_PER_GOAL,
    MAX_TIME_SPENT_SECONDS,
};
use crate::ports::{PortError, PortResult};

impl TrackerService {
    pub async fn list_subtasks(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<Vec<SubTask>> {
        self.store.get_goal(user_id, goal_id).await?;
        self.store.list_subtasks(goal_id).await
    }

    pub async fn get_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<SubTask> {
        self.store.get_subtask(user_id, subtask_id).await
    }

    pub async fn create_subtask(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        text: &str,
        position: Option<i32>,
    ) -> PortResult<SubTask> {
        let text = require_text(text, "text")?;
        self.store.get_goal(user_id, goal_id).await?;

        let existing = self.store.count_subtasks(goal_id).await?;
        if existing >= MAX_SUBTASKS_PER_GOAL {
            warn!(%user_id, %goal_id, existing, "Subtask limit reached");
            return Err(PortError::subtask_limit());
        }

        let max_position = self.store.max_subtask_position(goal_id).await?;
        let new_subtask = NewSubTask {
            goal_id,
            text,
            position: next_position(position, max_position),
            created_at: self.clock.now(),
        };
        let subtask = self
            .store
            .insert_subtask(new_subtask, MAX_SUBTASKS_PER_GOAL)
            .await?;
        info!(%goal_id, subtask_id = %subtask.id, position = subtask.position, "Subtask created");
        Ok(subtask)
    }

    /// Applies a partial update. When it flips `completed` from false to true the
    /// whole goal set is checked for completion; that check never fails the update.
    pub async fn update_subtask(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        mut patch: SubTaskPatch,
    ) -> PortResult<(SubTask, CompletionOutcome)> {
        if let Some(text) = patch.text.as_deref() {
            patch.text = Some(require_text(text, "text")?);
        }
        if let Some(t) = patch.time_spent {
            if t < 0 {
                return Err(PortError::Validation(
                    "time_spent must not be negative".to_string(),
                ));
            }
            if t > MAX_TIME_SPENT_SECONDS {
                return Err(PortError::Validation(format!(
                    "time_spent must not exceed {} seconds",
                    MAX_TIME_SPENT_SECONDS
                )));
            }
        }

        let before = self.store.get_subtask(user_id, subtask_id).await?;
        let updated = self
            .store
            .update_subtask(user_id, subtask_id, &patch, self.clock.now())
            .await?;

        let newly_completed = patch.completed == Some(true) && !before.completed;
        let outcome = if newly_completed {
            self.record_completion(user_id).await.unwrap_or_else(|e| {
                error!(%user_id, %subtask_id, "Completion check failed: {:?}", e);
                CompletionOutcome::default()
            })
        } else {
            CompletionOutcome::default()
        };
        Ok((updated, outcome))
    }

    pub async fn delete_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<()> {
        self.store.delete_subtask(user_id, subtask_id).await?;
        info!(%user_id, %subtask_id, "Subtask deleted");
        Ok(())
    }
}
