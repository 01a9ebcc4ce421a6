//! services/api/tests/handlers.rs
//!
//! Drives the axum handlers directly against the in-memory store.

use api_lib::adapters::TokioResetScheduler;
use api_lib::config::Config;
use api_lib::web::auth::{login_handler, signup_handler, LoginRequest, SignupRequest};
use api_lib::web::goals::{create_goal_handler, delete_goal_handler, CreateGoalRequest};
use api_lib::web::sessions::{
    active_session_handler, end_session_handler, start_session_handler, StartSessionRequest,
};
use api_lib::web::state::AppState;
use api_lib::web::subtasks::{
    create_subtask_handler, list_subtasks_handler, CreateSubTaskRequest, SubTaskListQuery,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use daily_goals_core::ports::SystemClock;
use daily_goals_core::{MemoryStore, TrackerService};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn app_state() -> Arc<AppState> {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/unused".to_string()),
        _ => None,
    })
    .unwrap();
    let scheduler = Arc::new(TokioResetScheduler::new(
        Duration::from_secs(3600),
        CancellationToken::new(),
    ));
    let service = TrackerService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
        scheduler,
    );
    Arc::new(AppState::new(service, Arc::new(config)))
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signup(state: &Arc<AppState>, email: &str) -> Uuid {
    let response = signup_handler(
        State(state.clone()),
        Json(SignupRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            display_name: None,
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["user_id"].as_str().unwrap().parse().unwrap()
}

async fn create_goal(state: &Arc<AppState>, user_id: Uuid, title: &str) -> Response {
    create_goal_handler(
        State(state.clone()),
        Extension(user_id),
        Json(CreateGoalRequest {
            title: title.to_string(),
            position: None,
        }),
    )
    .await
    .into_response()
}

#[tokio::test]
async fn signup_sets_a_session_cookie_that_authenticates() {
    let state = app_state();
    let response = signup_handler(
        State(state.clone()),
        Json(SignupRequest {
            email: "Ada@Example.com".to_string(),
            password: "correct horse".to_string(),
            display_name: Some("Ada".to_string()),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["email"], "ada@example.com");
    let token = body["session_token"].as_str().unwrap();
    let user_id = state
        .db
        .validate_auth_session(token, chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(user_id.to_string(), body["user_id"].as_str().unwrap());
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let state = app_state();
    signup(&state, "sam@example.com").await;

    let response = signup_handler(
        State(state.clone()),
        Json(SignupRequest {
            email: "sam@example.com".to_string(),
            password: "another".to_string(),
            display_name: None,
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let state = app_state();
    signup(&state, "sam@example.com").await;

    let response = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "sam@example.com".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid email or password");

    let response = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "sam@example.com".to_string(),
            password: "correct horse".to_string(),
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn fourth_goal_of_the_day_is_rejected() {
    let state = app_state();
    let user_id = signup(&state, "sam@example.com").await;

    for title in ["Read", "Write", "Run"] {
        let response = create_goal(&state, user_id, title).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = create_goal(&state, user_id, "Cook").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Daily goal limit reached (3 goals per day)"
    );
}

#[tokio::test]
async fn listing_subtasks_requires_a_goal_id() {
    let state = app_state();
    let user_id = signup(&state, "sam@example.com").await;

    let response = list_subtasks_handler(
        State(state.clone()),
        Extension(user_id),
        Query(SubTaskListQuery { goal_id: None }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "goal_id is required");
}

#[tokio::test]
async fn time_session_lifecycle_over_http() {
    let state = app_state();
    let user_id = signup(&state, "sam@example.com").await;

    let goal = body_json(create_goal(&state, user_id, "Launch").await).await;
    let goal_id: Uuid = goal["goal"]["id"].as_str().unwrap().parse().unwrap();

    let response = create_subtask_handler(
        State(state.clone()),
        Extension(user_id),
        Json(CreateSubTaskRequest {
            goal_id,
            text: "Ship it".to_string(),
            position: None,
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
    let subtask_id: Uuid = body_json(response).await["subtask"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let start = || {
        start_session_handler(
            State(state.clone()),
            Extension(user_id),
            Json(StartSessionRequest { subtask_id }),
        )
    };
    let response = start().await.into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session_id: Uuid = body_json(response).await["session"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(start().await.into_response().status(), StatusCode::CONFLICT);

    let active = body_json(
        active_session_handler(State(state.clone()), Extension(user_id))
            .await
            .into_response(),
    )
    .await;
    assert_eq!(active["session"]["id"], session_id.to_string());
    assert!(active["elapsed_seconds"].as_i64().unwrap() >= 0);

    let response = end_session_handler(State(state.clone()), Extension(user_id), Path(session_id))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let ended = body_json(response).await;
    assert!(ended["duration"].as_i64().unwrap() >= 0);
    assert_eq!(ended["subtask"]["completed"], true);
    assert_eq!(ended["completion"]["all_completed"], true);
    assert_eq!(ended["completion"]["streak_count"], 1);

    let response = end_session_handler(State(state.clone()), Extension(user_id), Path(session_id))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_goal_handler(State(state.clone()), Extension(user_id), Path(goal_id))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Goal deleted successfully");
}

#[tokio::test]
async fn other_users_goals_are_not_found() {
    let state = app_state();
    let owner = signup(&state, "owner@example.com").await;
    let intruder = signup(&state, "intruder@example.com").await;

    let goal = body_json(create_goal(&state, owner, "Private").await).await;
    let goal_id: Uuid = goal["goal"]["id"].as_str().unwrap().parse().unwrap();

    let response = delete_goal_handler(State(state.clone()), Extension(intruder), Path(goal_id))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
