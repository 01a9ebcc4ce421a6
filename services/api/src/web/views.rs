//! services/api/src/web/views.rs
//!
//! JSON representations of the core domain types. The core crate stays free of
//! serialization concerns; everything the HTTP surface sends is built here.

use chrono::{DateTime, NaiveDate, Utc};
use daily_goals_core::domain::{
    CompletionOutcome, Goal, GoalTimeSummary, GoalWithSubtasks, Profile, SubTask, TimeSession,
    TimeSessionDetail, TimeSummary,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Entities
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub streak_count: i32,
    pub last_streak_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileView {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            streak_count: p.streak_count,
            last_streak_on: p.last_streak_on,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubTaskView {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Accumulated seconds.
    pub time_spent: i64,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubTask> for SubTaskView {
    fn from(s: SubTask) -> Self {
        Self {
            id: s.id,
            goal_id: s.goal_id,
            text: s.text,
            completed: s.completed,
            time_spent: s.time_spent,
            position: s.position,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoalView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub expanded: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Goal> for GoalView {
    fn from(g: Goal) -> Self {
        Self {
            id: g.id,
            user_id: g.user_id,
            title: g.title,
            completed: g.completed,
            expanded: g.expanded,
            position: g.position,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

/// A goal with its subtasks in position order and its completion percentage.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoalDetailView {
    #[serde(flatten)]
    pub goal: GoalView,
    pub progress: u8,
    pub subtasks: Vec<SubTaskView>,
}

impl From<GoalWithSubtasks> for GoalDetailView {
    fn from(g: GoalWithSubtasks) -> Self {
        let progress = g.progress();
        Self {
            goal: g.goal.into(),
            progress,
            subtasks: g.subtasks.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSessionView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtask_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds, set once the session has ended.
    pub duration: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<TimeSession> for TimeSessionView {
    fn from(s: TimeSession) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            subtask_id: s.subtask_id,
            start_time: s.start_time,
            end_time: s.end_time,
            duration: s.duration,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSessionDetailView {
    #[serde(flatten)]
    pub session: TimeSessionView,
    pub subtask_text: String,
    pub goal_id: Uuid,
    pub goal_title: String,
}

impl From<TimeSessionDetail> for TimeSessionDetailView {
    fn from(d: TimeSessionDetail) -> Self {
        Self {
            session: d.session.into(),
            subtask_text: d.subtask_text,
            goal_id: d.goal_id,
            goal_title: d.goal_title,
        }
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct CompletionView {
    pub all_completed: bool,
    pub streak_incremented: bool,
    pub streak_count: Option<i32>,
}

impl From<CompletionOutcome> for CompletionView {
    fn from(c: CompletionOutcome) -> Self {
        Self {
            all_completed: c.all_completed,
            streak_incremented: c.streak_incremented,
            streak_count: c.streak_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoalTimeView {
    pub goal_id: Uuid,
    pub title: String,
    pub time_spent_seconds: i64,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completion_rate: u8,
}

impl From<GoalTimeSummary> for GoalTimeView {
    fn from(g: GoalTimeSummary) -> Self {
        Self {
            goal_id: g.goal_id,
            title: g.title,
            time_spent_seconds: g.time_spent_seconds,
            completed_tasks: g.completed_tasks,
            total_tasks: g.total_tasks,
            completion_rate: g.completion_rate,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub goals: Vec<GoalTimeView>,
    pub total_time_seconds: i64,
    pub total_completed: usize,
    pub total_tasks: usize,
}

impl From<TimeSummary> for StatsResponse {
    fn from(s: TimeSummary) -> Self {
        Self {
            goals: s.goals.into_iter().map(Into::into).collect(),
            total_time_seconds: s.total_time_seconds,
            total_completed: s.total_completed,
            total_tasks: s.total_tasks,
        }
    }
}

//=========================================================================================
// Response Envelopes
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: ProfileView,
}

#[derive(Serialize, ToSchema)]
pub struct GoalsResponse {
    pub goals: Vec<GoalDetailView>,
}

#[derive(Serialize, ToSchema)]
pub struct GoalDetailResponse {
    pub goal: GoalDetailView,
}

#[derive(Serialize, ToSchema)]
pub struct GoalResponse {
    pub goal: GoalView,
}

#[derive(Serialize, ToSchema)]
pub struct SubTasksResponse {
    pub subtasks: Vec<SubTaskView>,
}

#[derive(Serialize, ToSchema)]
pub struct SubTaskResponse {
    pub subtask: SubTaskView,
}

#[derive(Serialize, ToSchema)]
pub struct SubTaskUpdateResponse {
    pub subtask: SubTaskView,
    pub completion: CompletionView,
}

#[derive(Serialize, ToSchema)]
pub struct SessionsResponse {
    pub sessions: Vec<TimeSessionDetailView>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: TimeSessionView,
}

#[derive(Serialize, ToSchema)]
pub struct ActiveSessionResponse {
    pub session: Option<TimeSessionView>,
    pub elapsed_seconds: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct EndSessionResponse {
    pub session: TimeSessionView,
    pub duration: i64,
    /// The subtask after time accumulation; absent if that step failed.
    pub subtask: Option<SubTaskView>,
    pub completion: CompletionView,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
