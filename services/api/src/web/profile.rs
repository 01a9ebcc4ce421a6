//! services/api/src/web/profile.rs
//!
//! Profile and stats handlers.

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::views::{ProfileResponse, StatsResponse};
use axum::{extract::State, response::IntoResponse, Extension, Json};
use daily_goals_core::domain::ProfilePatch;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Fetch the caller's profile, creating it on first access.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.service.get_profile(user_id).await?;
    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = ProfilePatch {
        display_name: req.display_name,
        avatar_url: req.avatar_url,
    };
    let profile = state.service.update_profile(user_id, patch).await?;
    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}

/// Time spent and completion per goal, plus totals.
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Time summary of the current goals", body = StatsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.service.time_summary(user_id).await?;
    Ok(Json(StatsResponse::from(summary)))
}
