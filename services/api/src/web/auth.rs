//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use crate::error::ApiError;
use crate::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use daily_goals_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const SESSION_COOKIE: &str = "session";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    /// Same value as the `session` cookie, for clients sending `Authorization: Bearer`.
    pub session_token: String,
}

//=========================================================================================
// Session Token Helpers
//=========================================================================================

/// Reads the auth session id from the `session` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty());
    if let Some(id) = from_cookie {
        return Some(id.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn session_cookie(session_id: &str, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        max_age.num_seconds()
    )
}

/// Creates a fresh auth session for the user and returns its id with the cookie to set.
async fn open_auth_session(state: &AppState, user_id: Uuid) -> Result<(String, String), ApiError> {
    let lifetime = Duration::days(state.config.auth_session_days);
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = state.service.clock().now() + lifetime;

    state
        .db
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            e
        })?;

    let cookie = session_cookie(&auth_session_id, lifetime);
    Ok((auth_session_id, cookie))
}

fn validate_signup(req: &SignupRequest) -> Result<String, ApiError> {
    let email = req.email.trim().to_lowercase();
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .unwrap_or(false);
    if !well_formed {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    Ok(email)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_signup(&req)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    // 2. Create the user
    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let user = state
        .db
        .create_user_with_email(&email, &password_hash, display_name)
        .await?;
    info!(user_id = %user.user_id, "User signed up");

    // 3. Open an auth session
    let (session_token, cookie) = open_auth_session(&state, user.user_id).await?;

    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email,
        session_token,
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    // 1. Get user by email
    let user_creds = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => {
                warn!("Login attempt for unknown email");
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            other => ApiError::from(other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password)
        .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;
    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        warn!(user_id = %user_creds.user_id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    // 3. Open an auth session
    let (session_token, cookie) = open_auth_session(&state, user_creds.user_id).await?;
    info!(user_id = %user_creds.user_id, "User logged in");

    let response = AuthResponse {
        user_id: user_creds.user_id,
        email: user_creds.email,
        session_token,
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth_session_id = extract_session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("No session found".to_string()))?;

    state.db.delete_auth_session(&auth_session_id).await?;

    let cookie = session_cookie("", Duration::zero());
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}
