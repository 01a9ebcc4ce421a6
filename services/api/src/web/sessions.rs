//! services/api/src/web/sessions.rs
//!
//! REST handlers for time sessions. A caller has at most one open session.

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::views::{
    ActiveSessionResponse, EndSessionResponse, SessionResponse, SessionsResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionListQuery {
    /// Only sessions recorded against this subtask.
    pub subtask_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct StartSessionRequest {
    pub subtask_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/time-sessions",
    params(SessionListQuery),
    responses(
        (status = 200, description = "Sessions, newest first", body = SessionsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<SessionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state
        .service
        .list_sessions(user_id, query.subtask_id)
        .await?;
    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(Into::into).collect(),
    }))
}

/// The caller's open session, if any, with the seconds elapsed so far.
#[utoipa::path(
    get,
    path = "/time-sessions/active",
    responses(
        (status = 200, description = "Open session or null", body = ActiveSessionResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn active_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let response = match state.service.active_session(user_id).await? {
        Some((session, elapsed)) => ActiveSessionResponse {
            session: Some(session.into()),
            elapsed_seconds: Some(elapsed),
        },
        None => ActiveSessionResponse {
            session: None,
            elapsed_seconds: None,
        },
    };
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/time-sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionResponse),
        (status = 404, description = "Subtask not found"),
        (status = 409, description = "Another session is already active")
    )
)]
pub async fn start_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .service
        .start_session(user_id, req.subtask_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session: session.into(),
        }),
    ))
}

/// End a session: records its duration, adds it to the subtask and marks the
/// subtask completed.
#[utoipa::path(
    post,
    path = "/time-sessions/{id}/end",
    params(("id" = Uuid, Path, description = "Time session id")),
    responses(
        (status = 200, description = "Session ended", body = EndSessionResponse),
        (status = 404, description = "Time session not found"),
        (status = 409, description = "Time session already ended")
    )
)]
pub async fn end_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ended = state.service.end_session(user_id, session_id).await?;
    Ok(Json(EndSessionResponse {
        session: ended.session.into(),
        duration: ended.duration,
        subtask: ended.subtask.map(Into::into),
        completion: ended.completion.into(),
    }))
}
