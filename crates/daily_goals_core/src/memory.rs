//! crates/daily_goals_core/src/memory.rs
//!
//! An in-process `TrackerStore`. Every method runs under a single lock, which
//! gives it the same guarantees the relational schema provides: cascading
//! deletes, the one-open-session-per-user constraint, conditional session end
//! and cap checks that are atomic with their insert.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    Goal, GoalPatch, GoalWithSubtasks, NewGoal, NewProfile, NewSubTask, Profile, ProfilePatch,
    SubTask, SubTaskPatch, TimeSession, TimeSessionDetail, User, UserCredentials,
};
use crate::ports::{PortError, PortResult, TrackerStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    display_names: HashMap<Uuid, String>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    profiles: HashMap<Uuid, Profile>,
    goals: HashMap<Uuid, Goal>,
    subtasks: HashMap<Uuid, SubTask>,
    sessions: HashMap<Uuid, TimeSession>,
}

impl Tables {
    fn owned_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<&Goal> {
        self.goals
            .get(&goal_id)
            .filter(|g| g.user_id == user_id)
            .ok_or_else(|| PortError::NotFound("Goal not found".to_string()))
    }

    fn subtasks_of(&self, goal_id: Uuid) -> Vec<SubTask> {
        let mut subtasks: Vec<SubTask> = self
            .subtasks
            .values()
            .filter(|s| s.goal_id == goal_id)
            .cloned()
            .collect();
        subtasks.sort_by_key(|s| (s.position, s.created_at));
        subtasks
    }

    fn with_subtasks(&self, goal: &Goal) -> GoalWithSubtasks {
        GoalWithSubtasks {
            goal: goal.clone(),
            subtasks: self.subtasks_of(goal.id),
        }
    }

    fn user(&self, user_id: Uuid) -> PortResult<User> {
        let creds = self
            .users
            .get(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(User {
            user_id,
            email: creds.email.clone(),
            display_name: self.display_names.get(&user_id).cloned(),
        })
    }

    fn owns_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> bool {
        self.subtasks
            .get(&subtask_id)
            .and_then(|s| self.goals.get(&s.goal_id))
            .is_some_and(|g| g.user_id == user_id)
    }

    fn remove_subtask(&mut self, subtask_id: Uuid) {
        self.subtasks.remove(&subtask_id);
        self.sessions.retain(|_, s| s.subtask_id != subtask_id);
    }
}

/// A `TrackerStore` that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| PortError::Unexpected(format!("store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let mut t = self.lock()?;
        if t.users.values().any(|u| u.email == email) {
            return Err(PortError::Conflict("Email is already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        t.users.insert(
            user_id,
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        if let Some(name) = display_name {
            t.display_names.insert(user_id, name.to_string());
        }
        t.user(user_id)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.lock()?.user(user_id)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.lock()?
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> PortResult<Uuid> {
        match self.lock()?.auth_sessions.get(session_id) {
            Some(&(user_id, expires_at)) if expires_at > now => Ok(user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.lock()?.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        Ok(self.lock()?.profiles.get(&user_id).cloned())
    }

    async fn insert_profile_if_absent(&self, profile: NewProfile) -> PortResult<Profile> {
        let mut t = self.lock()?;
        let now = Utc::now();
        let stored = t.profiles.entry(profile.id).or_insert_with(|| Profile {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            avatar_url: None,
            streak_count: 0,
            last_streak_on: None,
            created_at: now,
            updated_at: now,
        });
        Ok(stored.clone())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> PortResult<Profile> {
        let mut t = self.lock()?;
        let profile = t
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound("Profile not found".to_string()))?;
        if let Some(name) = &patch.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(avatar) = &patch.avatar_url {
            profile.avatar_url = Some(avatar.clone());
        }
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn increment_streak(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> PortResult<bool> {
        let mut t = self.lock()?;
        let profile = t
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound("Profile not found".to_string()))?;
        if profile.last_streak_on == Some(day) {
            return Ok(false);
        }
        profile.streak_count += 1;
        profile.last_streak_on = Some(day);
        profile.updated_at = now;
        Ok(true)
    }

    async fn count_goals_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<i64> {
        let t = self.lock()?;
        Ok(t.goals
            .values()
            .filter(|g| g.user_id == user_id && g.created_at >= since)
            .count() as i64)
    }

    async fn max_goal_position(&self, user_id: Uuid) -> PortResult<Option<i32>> {
        let t = self.lock()?;
        Ok(t.goals
            .values()
            .filter(|g| g.user_id == user_id)
            .map(|g| g.position)
            .max())
    }

    async fn insert_goal(
        &self,
        goal: NewGoal,
        created_since: DateTime<Utc>,
        limit: i64,
    ) -> PortResult<Goal> {
        let mut t = self.lock()?;
        if !t.profiles.contains_key(&goal.user_id) {
            return Err(PortError::Unexpected(format!(
                "goal owner {} has no profile",
                goal.user_id
            )));
        }
        let created_today = t
            .goals
            .values()
            .filter(|g| g.user_id == goal.user_id && g.created_at >= created_since)
            .count() as i64;
        if created_today >= limit {
            return Err(PortError::daily_goal_limit());
        }
        let stored = Goal {
            id: Uuid::new_v4(),
            user_id: goal.user_id,
            title: goal.title,
            completed: false,
            expanded: false,
            position: goal.position,
            created_at: goal.created_at,
            updated_at: goal.created_at,
        };
        t.goals.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_goals(&self, user_id: Uuid) -> PortResult<Vec<GoalWithSubtasks>> {
        let t = self.lock()?;
        let mut goals: Vec<&Goal> = t.goals.values().filter(|g| g.user_id == user_id).collect();
        goals.sort_by_key(|g| (g.position, g.created_at));
        Ok(goals.into_iter().map(|g| t.with_subtasks(g)).collect())
    }

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<GoalWithSubtasks> {
        let t = self.lock()?;
        let goal = t.owned_goal(user_id, goal_id)?;
        Ok(t.with_subtasks(goal))
    }

    async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        patch: &GoalPatch,
        now: DateTime<Utc>,
    ) -> PortResult<Goal> {
        let mut t = self.lock()?;
        t.owned_goal(user_id, goal_id)?;
        let goal = t
            .goals
            .get_mut(&goal_id)
            .ok_or_else(|| PortError::NotFound("Goal not found".to_string()))?;
        if let Some(title) = &patch.title {
            goal.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            goal.completed = completed;
        }
        if let Some(expanded) = patch.expanded {
            goal.expanded = expanded;
        }
        if let Some(position) = patch.position {
            goal.position = position;
        }
        goal.updated_at = now;
        Ok(goal.clone())
    }

    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> PortResult<()> {
        let mut t = self.lock()?;
        t.owned_goal(user_id, goal_id)?;
        t.goals.remove(&goal_id);
        let children: Vec<Uuid> = t
            .subtasks
            .values()
            .filter(|s| s.goal_id == goal_id)
            .map(|s| s.id)
            .collect();
        for subtask_id in children {
            t.remove_subtask(subtask_id);
        }
        Ok(())
    }

    async fn count_subtasks(&self, goal_id: Uuid) -> PortResult<i64> {
        let t = self.lock()?;
        Ok(t.subtasks.values().filter(|s| s.goal_id == goal_id).count() as i64)
    }

    async fn max_subtask_position(&self, goal_id: Uuid) -> PortResult<Option<i32>> {
        let t = self.lock()?;
        Ok(t.subtasks
            .values()
            .filter(|s| s.goal_id == goal_id)
            .map(|s| s.position)
            .max())
    }

    async fn insert_subtask(&self, subtask: NewSubTask, limit: i64) -> PortResult<SubTask> {
        let mut t = self.lock()?;
        if !t.goals.contains_key(&subtask.goal_id) {
            return Err(PortError::NotFound("Goal not found".to_string()));
        }
        let existing = t
            .subtasks
            .values()
            .filter(|s| s.goal_id == subtask.goal_id)
            .count() as i64;
        if existing >= limit {
            return Err(PortError::subtask_limit());
        }
        let stored = SubTask {
            id: Uuid::new_v4(),
            goal_id: subtask.goal_id,
            text: subtask.text,
            completed: false,
            time_spent: 0,
            position: subtask.position,
            created_at: subtask.created_at,
            updated_at: subtask.created_at,
        };
        t.subtasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_subtasks(&self, goal_id: Uuid) -> PortResult<Vec<SubTask>> {
        Ok(self.lock()?.subtasks_of(goal_id))
    }

    async fn get_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<SubTask> {
        let t = self.lock()?;
        t.subtasks
            .get(&subtask_id)
            .filter(|s| {
                t.goals
                    .get(&s.goal_id)
                    .is_some_and(|g| g.user_id == user_id)
            })
            .cloned()
            .ok_or_else(|| PortError::NotFound("Subtask not found".to_string()))
    }

    async fn update_subtask(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        patch: &SubTaskPatch,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask> {
        let mut t = self.lock()?;
        if !t.owns_subtask(user_id, subtask_id) {
            return Err(PortError::NotFound("Subtask not found".to_string()));
        }
        let subtask = t
            .subtasks
            .get_mut(&subtask_id)
            .ok_or_else(|| PortError::NotFound("Subtask not found".to_string()))?;
        if let Some(text) = &patch.text {
            subtask.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            subtask.completed = completed;
        }
        if let Some(time_spent) = patch.time_spent {
            subtask.time_spent = time_spent;
        }
        if let Some(position) = patch.position {
            subtask.position = position;
        }
        subtask.updated_at = now;
        Ok(subtask.clone())
    }

    async fn delete_subtask(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<()> {
        let mut t = self.lock()?;
        if !t.owns_subtask(user_id, subtask_id) {
            return Err(PortError::NotFound("Subtask not found".to_string()));
        }
        t.remove_subtask(subtask_id);
        Ok(())
    }

    async fn accumulate_subtask_time(
        &self,
        subtask_id: Uuid,
        seconds: i64,
        now: DateTime<Utc>,
    ) -> PortResult<SubTask> {
        let mut t = self.lock()?;
        let subtask = t
            .subtasks
            .get_mut(&subtask_id)
            .ok_or_else(|| PortError::NotFound("Subtask not found".to_string()))?;
        subtask.time_spent = subtask.time_spent.saturating_add(seconds);
        subtask.completed = true;
        subtask.updated_at = now;
        Ok(subtask.clone())
    }

    async fn reset_day(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64> {
        let mut t = self.lock()?;
        let goal_ids: Vec<Uuid> = t
            .goals
            .values_mut()
            .filter(|g| g.user_id == user_id)
            .map(|g| {
                g.expanded = false;
                g.id
            })
            .collect();
        let mut touched = 0;
        for subtask in t
            .subtasks
            .values_mut()
            .filter(|s| goal_ids.contains(&s.goal_id))
        {
            subtask.completed = false;
            subtask.time_spent = 0;
            subtask.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }

    async fn find_open_session(&self, user_id: Uuid) -> PortResult<Option<TimeSession>> {
        let t = self.lock()?;
        Ok(t.sessions
            .values()
            .find(|s| s.user_id == user_id && s.is_active())
            .cloned())
    }

    async fn insert_session(
        &self,
        user_id: Uuid,
        subtask_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> PortResult<TimeSession> {
        let mut t = self.lock()?;
        if t.sessions
            .values()
            .any(|s| s.user_id == user_id && s.is_active())
        {
            return Err(PortError::session_already_active());
        }
        if !t.subtasks.contains_key(&subtask_id) {
            return Err(PortError::NotFound("Subtask not found".to_string()));
        }
        let session = TimeSession {
            id: Uuid::new_v4(),
            user_id,
            subtask_id,
            start_time,
            end_time: None,
            duration: None,
            created_at: start_time,
        };
        t.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<TimeSession> {
        self.lock()?
            .sessions
            .get(&session_id)
            .filter(|s| s.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Time session not found".to_string()))
    }

    async fn close_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> PortResult<Option<TimeSession>> {
        let mut t = self.lock()?;
        match t.sessions.get_mut(&session_id) {
            Some(session) if session.is_active() => {
                session.end_time = Some(end_time);
                session.duration = Some(duration);
                Ok(Some(session.clone()))
            }
            Some(_) => Ok(None),
            None => Err(PortError::NotFound("Time session not found".to_string())),
        }
    }

    async fn list_sessions(
        &self,
        user_id: Uuid,
        subtask_id: Option<Uuid>,
    ) -> PortResult<Vec<TimeSessionDetail>> {
        let t = self.lock()?;
        let mut details: Vec<TimeSessionDetail> = t
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| subtask_id.map_or(true, |id| s.subtask_id == id))
            .filter_map(|s| {
                let subtask = t.subtasks.get(&s.subtask_id)?;
                let goal = t.goals.get(&subtask.goal_id)?;
                Some(TimeSessionDetail {
                    session: s.clone(),
                    subtask_text: subtask.text.clone(),
                    goal_id: goal.id,
                    goal_title: goal.title.clone(),
                })
            })
            .collect();
        details.sort_by(|a, b| b.session.created_at.cmp(&a.session.created_at));
        Ok(details)
    }
}
