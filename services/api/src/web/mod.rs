pub mod auth;
pub mod goals;
pub mod middleware;
pub mod profile;
pub mod rest;
pub mod sessions;
pub mod state;
pub mod subtasks;
pub mod views;

pub use middleware::require_auth;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Builds the API routes: the auth endpoints are public, everything else
/// goes through `require_auth`.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/profile", get(profile::get_profile_handler))
        .route(
            "/profile",
            get(profile::get_profile_handler).put(profile::update_profile_handler),
        )
        .route("/stats", get(profile::stats_handler))
        .route(
            "/goals",
            get(goals::list_goals_handler).post(goals::create_goal_handler),
        )
        .route(
            "/goals/{id}",
            get(goals::get_goal_handler)
                .put(goals::update_goal_handler)
                .delete(goals::delete_goal_handler),
        )
        .route(
            "/subtasks",
            get(subtasks::list_subtasks_handler).post(subtasks::create_subtask_handler),
        )
        .route(
            "/subtasks/{id}",
            get(subtasks::get_subtask_handler)
                .put(subtasks::update_subtask_handler)
                .delete(subtasks::delete_subtask_handler),
        )
        .route(
            "/time-sessions",
            get(sessions::list_sessions_handler).post(sessions::start_session_handler),
        )
        .route("/time-sessions/active", get(sessions::active_session_handler))
        .route("/time-sessions/{id}/end", post(sessions::end_session_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
