//! crates/daily_goals_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A user may create at most this many goals per calendar day.
pub const MAX_GOALS_PER_DAY: i64 = 3;

/// A goal may hold at most this many subtasks.
pub const MAX_SUBTASKS_PER_GOAL: i64 = 3;

/// Upper bound for a manually set `time_spent` (ten years of seconds).
pub const MAX_TIME_SPENT_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

//=========================================================================================
// Accounts & Profiles
//=========================================================================================

// Represents an account - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    /// Display name chosen at signup, if any.
    pub display_name: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// The public-facing profile of a user, carrying the completion streak.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub streak_count: i32,
    /// Calendar day of the most recent streak increment.
    pub last_streak_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

//=========================================================================================
// Goals & Subtasks
//=========================================================================================

/// A daily objective owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    /// Presentation hint only.
    pub expanded: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A goal joined with its subtasks, ordered by position.
#[derive(Debug, Clone)]
pub struct GoalWithSubtasks {
    pub goal: Goal,
    pub subtasks: Vec<SubTask>,
}

impl GoalWithSubtasks {
    /// Percentage of completed subtasks, rounded. A goal without subtasks is at 0.
    pub fn progress(&self) -> u8 {
        let total = self.subtasks.len();
        if total == 0 {
            return 0;
        }
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        ((done as f64 / total as f64) * 100.0).round() as u8
    }

    pub fn total_time_spent(&self) -> i64 {
        self.subtasks
            .iter()
            .fold(0i64, |total, s| total.saturating_add(s.time_spent))
    }

    pub fn all_completed(&self) -> bool {
        self.subtasks.iter().all(|s| s.completed)
    }
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub expanded: Option<bool>,
    pub position: Option<i32>,
}

/// A sub-step of a goal.
#[derive(Debug, Clone)]
pub struct SubTask {
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

#[derive(Debug, Clone)]
pub struct NewSubTask {
    pub goal_id: Uuid,
    pub text: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SubTaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub time_spent: Option<i64>,
    pub position: Option<i32>,
}

//=========================================================================================
// Time Sessions
//=========================================================================================

/// One timed interval against exactly one subtask.
#[derive(Debug, Clone)]
pub struct TimeSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtask_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is active.
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds, set when the session ends.
    pub duration: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TimeSession {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whole seconds elapsed between the start and `now`, never negative.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_seconds().max(0)
    }
}

/// A time session joined with the subtask and goal it was recorded against.
#[derive(Debug, Clone)]
pub struct TimeSessionDetail {
    pub session: TimeSession,
    pub subtask_text: String,
    pub goal_id: Uuid,
    pub goal_title: String,
}

/// Result of ending a session: the authoritative session write plus the
/// outcome of its best-effort side effects.
#[derive(Debug, Clone)]
pub struct EndedSession {
    pub session: TimeSession,
    pub duration: i64,
    /// The subtask after time accumulation; `None` if that step failed.
    pub subtask: Option<SubTask>,
    pub completion: CompletionOutcome,
}

//=========================================================================================
// Streak & Stats
//=========================================================================================

/// What happened when a completion was checked against the whole goal set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub all_completed: bool,
    pub streak_incremented: bool,
    pub streak_count: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct GoalTimeSummary {
    pub goal_id: Uuid,
    pub title: String,
    pub time_spent_seconds: i64,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completion_rate: u8,
}

#[derive(Debug, Clone)]
pub struct TimeSummary {
    pub goals: Vec<GoalTimeSummary>,
    pub total_time_seconds: i64,
    pub total_completed: usize,
    pub total_tasks: usize,
}

/// True when the user has at least one subtask and every subtask of every goal
/// is completed. Goals without subtasks do not block completion.
pub fn all_subtasks_completed(goals: &[GoalWithSubtasks]) -> bool {
    let has_any = goals.iter().any(|g| !g.subtasks.is_empty());
    has_any && goals.iter().all(GoalWithSubtasks::all_completed)
}
