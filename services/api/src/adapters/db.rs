//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `TrackerStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use daily_goals_core::domain::{
    Goal, GoalPatch, GoalWithSubtasks, NewGoal, NewProfile, NewSubTask, Profile, ProfilePatch,
    SubTask, SubTaskPatch, TimeSession, TimeSessionDetail, User, UserCredentials,
};
use daily_goals_core::ports::{PortError, PortResult, TrackerStore};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

/// Name of the partial unique index allowing one open session per user.
const ONE_OPEN_SESSION_INDEX: &str = "time_sessions_one_open_per_user";

const GOAL_COLUMNS: &str =
    "id, user_id, title, completed, expanded, position, created_at, updated_at";
const SUBTASK_COLUMNS: &str =
    "id, goal_id, text, completed, time_spent, position, created_at, updated_at";
const SESSION_COLUMNS: &str =
    "id, user_id, subtask_id, start_time, end_time, duration, created_at";
const PROFILE_COLUMNS: &str =
    "id, email, display_name, avatar_url, streak_count, last_streak_on, created_at, updated_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `TrackerStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: &str) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} not found", what)),
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    display_name: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            display_name: self.display_name,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    streak_count: i32,
    last_streak_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            streak_count: self.streak_count,
            last_streak_on: self.last_streak_on,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct GoalRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    completed: bool,
    expanded: bool,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl GoalRecord {
    fn to_domain(self) -> Goal {
        Goal {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            completed: self.completed,
            expanded: self.expanded,
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SubTaskRecord {
    id: Uuid,
    goal_id: Uuid,
    text: String,
    completed: bool,
    time_spent: i64,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl SubTaskRecord {
    fn to_domain(self) -> SubTask {
        SubTask {
            id: self.id,
            goal_id: self.goal_id,
            text: self.text,
            completed: self.completed,
            time_spent: self.time_spent,
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    subtask_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration: Option<i64>,
    created_at: DateTime<Utc>,
}
impl SessionRecord {
    fn to_domain(self) -> TimeSession {
        TimeSession {
            id: self.id,
            user_id: self.user_id,
            subtask_id: self.subtask_id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SessionDetailRecord {
    #[sqlx(flatten)]
    session: SessionRecord,
    subtask_text: String,
    goal_id: Uuid,
    goal_title: String,
}
impl SessionDetailRecord {
    fn to_domain(self) -> TimeSessionDetail {
        TimeSessionDetail {
            session: self.session.to_domain(),
            subtask_text: self.subtask_text,
            goal_id: self.goal_id,
            goal_title: self.goal_title,
        }
    }
}

impl DbAdapter {
    /// Loads the subtasks of the given goals and attaches them, keeping goal order.
    async fn attach_subtasks(&self, goals: Vec<GoalRecord>) -> PortResult<Vec<GoalWithSubtasks>> {
        let goal_ids: Vec<Uuid> = goals.iter().map(|g| g.id).collect();
        let records = sqlx::query_as::<_, SubTaskRecord>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE goal_id = ANY($1) ORDER BY position ASC, created_at ASC"
        ))
        .bind(&goal_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut by_goal: HashMap<Uuid, Vec<SubTask>> = HashMap::new();
        for record in records {
            by_goal
                .entry(record.goal_id)
                .or_default()
                .push(record.to_domain());
        }

        Ok(goals
            .into_iter()
            .map(|g| GoalWithSubtasks {
                subtasks: by_goal.remove(&g.id).unwrap_or_default(),
                goal: g.to_domain(),
            })
            .collect())
    }
}

//=========================================================================================
// `TrackerStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TrackerStore for DbAdapter {
    // --- Accounts & Auth ---

    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password, display_name) VALUES ($1, $2, $3, $4) \
             RETURNING user_id, email, display_name",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict("Email is already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, display_name FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, &format!("User {}", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, &format!("User {}", email)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > $2",
        )
        .bind(session_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Profiles ---

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ProfileRecord::to_domain))
    }

    async fn insert_profile_if_absent(&self, profile: NewProfile) -> PortResult<Profile> {
        sqlx::query(
            "INSERT INTO profiles (id, email, display_name) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        self.get_profile(profile.id)
            .await?
            .ok_or_else(|| PortError::NotFound("Profile not found".to_string()))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "UPDATE profiles SET display_name = COALESCE($2, display_name), \
             avatar_url = COALESCE($3, avatar_url), updated_at = $4 \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&patch.display_name)
        .bind(&patch.avatar_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Profile"))?;
        Ok(record.to_domain())
    }

    async fn increment_streak(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE profiles SET streak_count = streak_count + 1, last_streak_on = $2, updated_at = $3 \
             WHERE id = $1 AND last_streak_on IS DISTINCT FROM $2",
        )
        .bind(user_id)
        .bind(day)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Goals ---

    async fn count_goals_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM goals WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn max_goal_position(&self, user_id: Uuid) -> PortResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(position) FROM goals WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn insert_goal(
        &self,
        goal: NewGoal,
        created_since: DateTime<Utc>,
        limit: i64,
    ) -> PortResult<Goal> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Locking the owner's profile row serializes concurrent creates for one user.
        sqlx::query("SELECT id FROM profiles WHERE id = $1 FOR UPDATE")
            .bind(goal.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Profile"))?;

        let created_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM goals WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(goal.user_id)
        .bind(created_since)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;
        if created_today >= limit {
            return Err(PortError::daily_goal_limit());
        }

        let record = sqlx::query_as::<_, GoalRecord>(&format!(
            "INSERT INTO goals (id, user_id, title, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {GOAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(goal.position)
        .bind(goal.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_goals(&self, user_id: Uuid) -> PortResult<Vec<GoalWithSubtasks>> {
        let goals = sqlx::query_as::<_, GoalRecord>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY position ASC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.attach_subtasks(goals).await
    }

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<GoalWithSubtasks> {
        let goal = sqlx::query_as::<_, GoalRecord>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(goal_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Goal"))?;

        self.attach_subtasks(vec![goal])
            .await?
            .pop()
            .ok_or_else(|| PortError::NotFound("Goal not found".to_string()))
    }

    async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        patch: &GoalPatch,
        now: DateTime<Utc>,
    ) -> PortResult<Goal> {
        let record = sqlx::query_as::<_, GoalRecord>(&format!(
            "UPDATE goals SET title = COALESCE($3, title), completed = COALESCE($4, completed), \
             expanded = COALESCE($5, expanded), position = COALESCE($6, position), updated_at = $7 \
             WHERE id = $1 AND user_id = $2 RETURNING {GOAL_COLUMNS}"
        ))
        .bind(goal_id)
        .bind(user_id)
        .bind(&patch.title)
        .bind(patch.completed)
        .bind(patch.expanded)
        .bind(patch.position)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Goal"))?;
        Ok(record.to_domain())
    }

    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<()> {
        // Subtasks and their sessions go with the goal via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Goal not found".to_string()));
        }
        Ok(())
    }

    // --- Subtasks ---

    async fn count_subtasks(&self, goal_id: Uuid) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subtasks WHERE goal_id = $1")
            .bind(goal_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn max_subtask_position(&self, goal_id: Uuid) -> PortResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(position) FROM subtasks WHERE goal_id = $1")
            .bind(goal_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn insert_subtask(&self, subtask: NewSubTask, limit: i64) -> PortResult<SubTask> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("SELECT id FROM goals WHERE id = $1 FOR UPDATE")
            .bind(subtask.goal_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Goal"))?;

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subtasks WHERE goal_id = $1")
                .bind(subtask.goal_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(unexpected)?;
        if existing >= limit {
            return Err(PortError::subtask_limit());
        }

        let record = sqlx::query_as::<_, SubTaskRecord>(&format!(
            "INSERT INTO subtasks (id, goal_id, text, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {SUBTASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(subtask.goal_id)
        .bind(&subtask.text)
        .bind(subtask.position)
        .bind(subtask.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_subtasks(&self, goal_id: Uuid) -> PortResult<Vec<SubTask>> {
        let records = sqlx::query_as::<_, SubTaskRecord>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE goal_id = $1 ORDER BY position ASC, created_at ASC"
        ))
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<SubTask> {
        let record = sqlx::query_as::<_, SubTaskRecord>(
            "SELECT s.id, s.goal_id, s.text, s.completed, s.time_spent, s.position, s.created_at, s.updated_at \
             FROM subtasks s JOIN goals g ON g.id = s.goal_id \
             WHERE s.id = $1 AND g.user_id = $2",
        )
        .bind(subtask_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Subtask"))?;
        Ok(record.to_domain())
    }

    async fn update_subtask(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        patch: &SubTaskPatch,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask> {
        let record = sqlx::query_as::<_, SubTaskRecord>(&format!(
            "UPDATE subtasks SET text = COALESCE($2, text), completed = COALESCE($3, completed), \
             time_spent = COALESCE($4, time_spent), position = COALESCE($5, position), updated_at = $6 \
             WHERE id = $1 AND goal_id IN (SELECT id FROM goals WHERE user_id = $7) \
             RETURNING {SUBTASK_COLUMNS}"
        ))
        .bind(subtask_id)
        .bind(&patch.text)
        .bind(patch.completed)
        .bind(patch.time_spent)
        .bind(patch.position)
        .bind(now)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Subtask"))?;
        Ok(record.to_domain())
    }

    async fn delete_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<()> {
        let result = sqlx::query(
            "DELETE FROM subtasks WHERE id = $1 AND goal_id IN (SELECT id FROM goals WHERE user_id = $2)",
        )
        .bind(subtask_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Subtask not found".to_string()));
        }
        Ok(())
    }

    async fn accumulate_subtask_time(
        &self,
        subtask_id: Uuid,
        seconds: i64,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask> {
        // Saturates at the BIGINT maximum instead of failing the update.
        let record = sqlx::query_as::<_, SubTaskRecord>(&format!(
            "UPDATE subtasks SET time_spent = LEAST(time_spent, $4 - $2) + $2, completed = TRUE, updated_at = $3 \
             WHERE id = $1 RETURNING {SUBTASK_COLUMNS}"
        ))
        .bind(subtask_id)
        .bind(seconds)
        .bind(now)
        .bind(i64::MAX)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Subtask"))?;
        Ok(record.to_domain())
    }

    async fn reset_day(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result = sqlx::query(
            "UPDATE subtasks SET completed = FALSE, time_spent = 0, updated_at = $2 \
             WHERE goal_id IN (SELECT id FROM goals WHERE user_id = $1)",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("UPDATE goals SET expanded = FALSE, updated_at = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Time Sessions ---

    async fn find_open_session(&self, user_id: Uuid) -> PortResult<Option<TimeSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM time_sessions WHERE user_id = $1 AND end_time IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn insert_session(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> PortResult<TimeSession> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO time_sessions (id, user_id, subtask_id, start_time, created_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(subtask_id)
        .bind(start_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if db.is_unique_violation() && db.constraint() == Some(ONE_OPEN_SESSION_INDEX) =>
            {
                PortError::session_already_active()
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<TimeSession> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM time_sessions WHERE id = $1 AND user_id = $2"
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, "Time session"))?;
        Ok(record.to_domain())
    }

    async fn close_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> PortResult<Option<TimeSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "UPDATE time_sessions SET end_time = $2, duration = $3 \
             WHERE id = $1 AND end_time IS NULL RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(end_time)
        .bind(duration)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn list_sessions(
        &self,
        user_id: Uuid,
        subtask_id: Option<Uuid>,
    ) -> PortResult<Vec<TimeSessionDetail>> {
        let records = sqlx::query_as::<_, SessionDetailRecord>(
            "SELECT t.id, t.user_id, t.subtask_id, t.start_time, t.end_time, t.duration, t.created_at, \
                    s.text AS subtask_text, g.id AS goal_id, g.title AS goal_title \
             FROM time_sessions t \
             JOIN subtasks s ON s.id = t.subtask_id \
             JOIN goals g ON g.id = s.goal_id \
             WHERE t.user_id = $1 AND ($2::uuid IS NULL OR t.subtask_id = $2) \
             ORDER BY t.created_at DESC",
        )
        .bind(user_id)
        .bind(subtask_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
