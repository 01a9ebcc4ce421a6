//! services/api/src/web/subtasks.rs
//!
//! REST handlers for subtasks. Ownership is checked through the parent goal.

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::views::{MessageResponse, SubTaskResponse, SubTaskUpdateResponse, SubTasksResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use daily_goals_core::domain::SubTaskPatch;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubTaskListQuery {
    /// Goal whose subtasks to list.
    pub goal_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSubTaskRequest {
    pub goal_id: Uuid,
    pub text: String,
    pub position: Option<i32>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateSubTaskRequest {
    pub text: Option<String>,
    pub completed: Option<bool>,
    /// Seconds, between 0 and ten years.
    pub time_spent: Option<i64>,
    pub position: Option<i32>,
}

impl From<UpdateSubTaskRequest> for SubTaskPatch {
    fn from(req: UpdateSubTaskRequest) -> Self {
        SubTaskPatch {
            text: req.text,
            completed: req.completed,
            time_spent: req.time_spent,
            position: req.position,
        }
    }
}

#[utoipa::path(
    get,
    path = "/subtasks",
    params(SubTaskListQuery),
    responses(
        (status = 200, description = "Subtasks ordered by position", body = SubTasksResponse),
        (status = 400, description = "goal_id missing"),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn list_subtasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<SubTaskListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let goal_id = query
        .goal_id
        .ok_or_else(|| ApiError::BadRequest("goal_id is required".to_string()))?;
    let subtasks = state.service.list_subtasks(user_id, goal_id).await?;
    Ok(Json(SubTasksResponse {
        subtasks: subtasks.into_iter().map(Into::into).collect(),
    }))
}

/// Create a subtask. A goal holds at most three subtasks.
#[utoipa::path(
    post,
    path = "/subtasks",
    request_body = CreateSubTaskRequest,
    responses(
        (status = 201, description = "Subtask created", body = SubTaskResponse),
        (status = 400, description = "Blank text or subtask limit reached"),
        (status = 404, description = "Goal not found")
    )
)]
pub async fn create_subtask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateSubTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subtask = state
        .service
        .create_subtask(user_id, req.goal_id, &req.text, req.position)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubTaskResponse {
            subtask: subtask.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/subtasks/{id}",
    params(("id" = Uuid, Path, description = "Subtask id")),
    responses(
        (status = 200, description = "The subtask", body = SubTaskResponse),
        (status = 404, description = "Subtask not found")
    )
)]
pub async fn get_subtask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(subtask_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let subtask = state.service.get_subtask(user_id, subtask_id).await?;
    Ok(Json(SubTaskResponse {
        subtask: subtask.into(),
    }))
}

/// Partially update a subtask. Marking the last open subtask completed
/// reports the all-complete state and streak in `completion`.
#[utoipa::path(
    put,
    path = "/subtasks/{id}",
    params(("id" = Uuid, Path, description = "Subtask id")),
    request_body = UpdateSubTaskRequest,
    responses(
        (status = 200, description = "Subtask updated", body = SubTaskUpdateResponse),
        (status = 400, description = "Blank text or time_spent out of range"),
        (status = 404, description = "Subtask not found")
    )
)]
pub async fn update_subtask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(subtask_id): Path<Uuid>,
    Json(req): Json<UpdateSubTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (subtask, completion) = state
        .service
        .update_subtask(user_id, subtask_id, req.into())
        .await?;
    Ok(Json(SubTaskUpdateResponse {
        subtask: subtask.into(),
        completion: completion.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/subtasks/{id}",
    params(("id" = Uuid, Path, description = "Subtask id")),
    responses(
        (status = 200, description = "Subtask deleted", body = MessageResponse),
        (status = 404, description = "Subtask not found")
    )
)]
pub async fn delete_subtask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(subtask_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_subtask(user_id, subtask_id).await?;
    Ok(Json(MessageResponse::new("Subtask deleted successfully")))
}
