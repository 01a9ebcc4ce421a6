//! services/api/src/web/goals.rs
//!
//! REST handlers for goals. Every route is behind `require_auth`.

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::views::{GoalDetailResponse, GoalResponse, GoalsResponse, MessageResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use daily_goals_core::domain::GoalPatch;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateGoalRequest {
    pub title: String,
    /// Defaults to one past the caller's highest position.
    pub position: Option<i32>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub expanded: Option<bool>,
    pub position: Option<i32>,
}

impl From<UpdateGoalRequest> for GoalPatch {
    fn from(req: UpdateGoalRequest) -> Self {
        GoalPatch {
            title: req.title,
            completed: req.completed,
            expanded: req.expanded,
            position: req.position,
        }
    }
}

/// List the caller's goals with their subtasks.
#[utoipa::path(
    get,
    path = "/goals",
    responses(
        (status = 200, description = "Goals ordered by position", body = GoalsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_goals_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goals = state.service.list_goals(user_id).await?;
    Ok(Json(GoalsResponse {
        goals: goals.into_iter().map(Into::into).collect(),
    }))
}

/// Create a goal. At most three goals may be created per calendar day.
#[utoipa::path(
    post,
    path = "/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Blank title or daily goal limit reached"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state
        .service
        .create_goal(user_id, &req.title, req.position)
        .await?;
    Ok((StatusCode::CREATED, Json(GoalResponse { goal: goal.into() })))
}

#[utoipa::path(
    get,
    path = "/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    responses(
        (status = 200, description = "The goal with its subtasks", body = GoalDetailResponse),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn get_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(goal_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.service.get_goal(user_id, goal_id).await?;
    Ok(Json(GoalDetailResponse { goal: goal.into() }))
}

/// Partially update a goal; absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Blank title"),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn update_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state
        .service
        .update_goal(user_id, goal_id, req.into())
        .await?;
    Ok(Json(GoalResponse { goal: goal.into() }))
}

/// Delete a goal together with its subtasks and their time sessions.
#[utoipa::path(
    delete,
    path = "/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    responses(
        (status = 200, description = "Goal deleted", body = MessageResponse),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn delete_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(goal_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_goal(user_id, goal_id).await?;
    Ok(Json(MessageResponse::new("Goal deleted successfully")))
}
