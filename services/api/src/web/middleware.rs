//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use daily_goals_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::web::auth::extract_session_token;
use crate::web::state::AppState;

/// Middleware that validates the auth session and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// A missing, unknown or expired session is rejected with 401 before any
/// handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Read the session id from the cookie or bearer header
    let auth_session_id =
        extract_session_token(req.headers()).ok_or(PortError::Unauthorized)?;

    // 2. Validate auth session in the store, get user_id
    let now = state.service.clock().now();
    let user_id = state
        .db
        .validate_auth_session(&auth_session_id, now)
        .await
        .map_err(session_lookup_error)?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Only a rejected session is a 401; store failures keep their own status.
fn session_lookup_error(e: PortError) -> ApiError {
    match e {
        PortError::Unauthorized => {
            warn!("Rejected auth session");
            ApiError::Port(PortError::Unauthorized)
        }
        other => {
            error!("Auth session lookup failed: {:?}", other);
            ApiError::from(other)
        }
    }
}
