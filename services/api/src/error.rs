//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use daily_goals_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from running the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed request the handler rejected before reaching the service.
    #[error("{0}")]
    BadRequest(String),

    /// Rejected credentials, with the message shown to the caller.
    #[error("{0}")]
    Unauthorized(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(PortError::Unauthorized) | ApiError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::LimitExceeded(_) | PortError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Port(PortError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Port(PortError::Unauthorized) => "Unauthorized".to_string(),
            ApiError::Port(
                PortError::NotFound(msg)
                | PortError::LimitExceeded(msg)
                | PortError::Validation(msg)
                | PortError::Conflict(msg),
            ) => msg.clone(),
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg.clone(),
            // Server-side details stay in the logs.
            other => {
                error!("Request failed: {:?}", other);
                "Internal server error".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_their_status_classes() {
        let cases = [
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::NotFound("Goal not found".into()), StatusCode::NOT_FOUND),
            (PortError::daily_goal_limit(), StatusCode::BAD_REQUEST),
            (PortError::Validation("title is required".into()), StatusCode::BAD_REQUEST),
            (PortError::session_already_active(), StatusCode::CONFLICT),
            (PortError::Unexpected("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn server_errors_do_not_leak_details() {
        let response =
            ApiError::from(PortError::Unexpected("password column missing".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Internal server error");
    }

    #[tokio::test]
    async fn domain_errors_carry_their_message() {
        let response = ApiError::from(PortError::subtask_limit()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Subtask limit reached (3 per goal)");
    }
}
