//! crates/daily_goals_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or timers.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::{
    Goal, GoalPatch, GoalWithSubtasks, NewGoal, NewProfile, NewSubTask, Profile, ProfilePatch,
    SubTask, SubTaskPatch, TimeSession, TimeSessionDetail, User, UserCredentials,
    MAX_GOALS_PER_DAY, MAX_SUBTASKS_PER_GOAL,
};
use crate::service::DayReset;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    LimitExceeded(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

impl PortError {
    pub fn daily_goal_limit() -> Self {
        Self::LimitExceeded(format!(
            "Daily goal limit reached ({} goals per day)",
            MAX_GOALS_PER_DAY
        ))
    }

    pub fn subtask_limit() -> Self {
        Self::LimitExceeded(format!(
            "Subtask limit reached ({} per goal)",
            MAX_SUBTASKS_PER_GOAL
        ))
    }

    pub fn session_already_active() -> Self {
        Self::Conflict("Another time session is already active".to_string())
    }

    pub fn session_already_ended() -> Self {
        Self::Conflict("Time session already ended".to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence Port
//=========================================================================================

/// Every lookup that takes a `user_id` applies it as an ownership predicate:
/// rows owned by someone else are reported as `NotFound`, exactly like missing rows.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    // --- Accounts & Auth ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live auth session to its user, `Unauthorized` if unknown or expired.
    async fn validate_auth_session(&self, session_id: &str, now: DateTime<Utc>)
        -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Profiles ---
    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>>;

    /// Inserts the profile unless one already exists, returning the stored row either way.
    async fn insert_profile_if_absent(&self, profile: NewProfile) -> PortResult<Profile>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> PortResult<Profile>;

    /// Adds one to the streak unless it was already incremented on `day`.
    /// Returns whether the increment happened.
    async fn increment_streak(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> PortResult<bool>;

    // --- Goals ---
    async fn count_goals_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<i64>;

    async fn max_goal_position(&self, user_id: Uuid) -> PortResult<Option<i32>>;

    /// Inserts a goal, re-checking the daily cap atomically with the write.
    async fn insert_goal(
        &self,
        goal: NewGoal,
        created_since: DateTime<Utc>,
        limit: i64,
    ) -> PortResult<Goal>;

    async fn list_goals(&self, user_id: Uuid) -> PortResult<Vec<GoalWithSubtasks>>;

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<GoalWithSubtasks>;

    async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        patch: &GoalPatch,
        now: DateTime<Utc>,
    ) -> PortResult<Goal>;

    /// Deletes the goal together with its subtasks and their time sessions.
    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<()>;

    // --- Subtasks ---
    async fn count_subtasks(&self, goal_id: Uuid) -> PortResult<i64>;

    async fn max_subtask_position(&self, goal_id: Uuid) -> PortResult<Option<i32>>;

    /// Inserts a subtask, re-checking the per-goal cap atomically with the write.
    async fn insert_subtask(&self, subtask: NewSubTask, limit: i64) -> PortResult<SubTask>;

    async fn list_subtasks(&self, goal_id: Uuid) -> PortResult<Vec<SubTask>>;

    /// Fetches a subtask through its parent goal's owner.
    async fn get_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<SubTask>;

    /// Writes only if the subtask's goal belongs to `user_id`.
    async fn update_subtask(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        patch: &SubTaskPatch,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask>;

    async fn delete_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<()>;

    /// Adds `seconds` to `time_spent` in place and marks the subtask completed.
    async fn accumulate_subtask_time(
        &self,
        subtask_id: Uuid,
        seconds: i64,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask>;

    /// Clears completion and time on every subtask of the user's goals and
    /// collapses the goals. Returns the number of subtasks touched.
    async fn reset_day(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64>;

    // --- Time Sessions ---
    async fn find_open_session(&self, user_id: Uuid) -> PortResult<Option<TimeSession>>;

    /// Opens a session. Fails with `Conflict` if the user already has an open one.
    async fn insert_session(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> PortResult<TimeSession>;

    async fn get_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<TimeSession>;

    /// Sets the end of a still-open session. `None` if it was already closed.
    async fn close_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> PortResult<Option<TimeSession>>;

    /// Sessions of the user, newest first, optionally narrowed to one subtask.
    async fn list_sessions(
        &self,
        user_id: Uuid,
        subtask_id: Option<Uuid>,
    ) -> PortResult<Vec<TimeSessionDetail>>;
}

//=========================================================================================
// Clock Port
//=========================================================================================

/// The source of "now" and of calendar-day boundaries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day `at` falls on.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    /// The instant the calendar day containing `at` began.
    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc>;
}

/// Wall clock using the host's local timezone for day boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.local_date(at).and_time(NaiveTime::MIN);
        // A DST jump can skip local midnight; fall back to UTC midnight then.
        Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc())
    }
}

//=========================================================================================
// Reset Scheduling Port
//=========================================================================================

/// Runs a day reset at some later point, after the "all complete" state has
/// been visible to the user for a while.
pub trait ResetScheduler: Send + Sync {
    fn schedule(&self, reset: DayReset);
}
