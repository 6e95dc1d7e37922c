//! API error types and JSON error response formatting.
//!
//! The contact endpoint has its own wire shape and does not go through here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use confidante_blog::BlogError;
use confidante_core::error::ConfidanteError;
use confidante_dialogue::DialogueError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The resource exists but is in a state that forbids the request.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DialogueError> for ApiError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::SessionNotFound(id) => {
                ApiError::NotFound(format!("Chat session {id} not found"))
            }
            DialogueError::SessionClosed(id) => {
                ApiError::Conflict(format!("Chat session {id} is closed"))
            }
            DialogueError::GreetingPending(id) => ApiError::Conflict(format!(
                "Chat session {id} has not shown its greeting yet"
            )),
            DialogueError::SessionLimitReached(max) => ApiError::ServiceUnavailable(format!(
                "Too many open chat sessions (limit {max})"
            )),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ConfidanteError> for ApiError {
    fn from(err: ConfidanteError) -> Self {
        match err {
            ConfidanteError::Config(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_from_dialogue_error() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(DialogueError::SessionNotFound(id)),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(DialogueError::SessionClosed(id)),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(DialogueError::GreetingPending(id)),
            ApiError::Conflict(msg) if msg.contains("greeting")
        ));
        assert!(matches!(
            ApiError::from(DialogueError::SessionLimitReached(3)),
            ApiError::ServiceUnavailable(msg) if msg.contains("limit 3")
        ));
    }

    #[test]
    fn test_from_confidante_error() {
        assert!(matches!(
            ApiError::from(ConfidanteError::Config("bad".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ConfidanteError::Content("bad".into())),
            ApiError::Internal(_)
        ));
    }
}
