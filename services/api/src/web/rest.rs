//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use crate::web::{auth, goals, profile, sessions, subtasks, views};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::stats_handler,
        goals::list_goals_handler,
        goals::create_goal_handler,
        goals::get_goal_handler,
        goals::update_goal_handler,
        goals::delete_goal_handler,
        subtasks::list_subtasks_handler,
        subtasks::create_subtask_handler,
        subtasks::get_subtask_handler,
        subtasks::update_subtask_handler,
        subtasks::delete_subtask_handler,
        sessions::list_sessions_handler,
        sessions::active_session_handler,
        sessions::start_session_handler,
        sessions::end_session_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            profile::UpdateProfileRequest,
            goals::CreateGoalRequest,
            goals::UpdateGoalRequest,
            subtasks::CreateSubTaskRequest,
            subtasks::UpdateSubTaskRequest,
            sessions::StartSessionRequest,
            views::ProfileView,
            views::ProfileResponse,
            views::GoalView,
            views::GoalDetailView,
            views::GoalsResponse,
            views::GoalResponse,
            views::GoalDetailResponse,
            views::SubTaskView,
            views::SubTasksResponse,
            views::SubTaskResponse,
            views::SubTaskUpdateResponse,
            views::CompletionView,
            views::TimeSessionView,
            views::TimeSessionDetailView,
            views::SessionsResponse,
            views::SessionResponse,
            views::ActiveSessionResponse,
            views::EndSessionResponse,
            views::GoalTimeView,
            views::StatsResponse,
            views::MessageResponse,
        )
    ),
    tags(
        (name = "Daily Goals API", description = "Daily goals, subtasks, time sessions and streaks.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/signup",
            "/profile",
            "/stats",
            "/goals",
            "/goals/{id}",
            "/subtasks",
            "/subtasks/{id}",
            "/time-sessions",
            "/time-sessions/active",
            "/time-sessions/{id}/end",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
