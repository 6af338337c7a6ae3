//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use todosync_engine::Error as EngineError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(e) => match e {
                EngineError::Validation(_) | EngineError::InvalidArgument(_) => {
                    StatusCode::BAD_REQUEST
                }
                EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::ConstraintViolation(_) => StatusCode::CONFLICT,
                EngineError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                EngineError::NetworkUnavailable(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, details) = match &self {
            AppError::Engine(e) if e.is_unavailable() => {
                tracing::error!("Engine error: {:?}", e);
                ("Service unavailable".to_string(), Some(e.to_string()))
            }
            AppError::Engine(e) => {
                tracing::warn!("Engine error: {:?}", e);
                (e.to_string(), None)
            }
            AppError::BadRequest(msg) => (msg.clone(), None),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use todosync_engine::RecordKey;

    #[test]
    fn engine_errors_map_to_statuses() {
        let key = RecordKey::new(1, "dev1");
        let cases = [
            (EngineError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (EngineError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (EngineError::NotFound(key.clone()), StatusCode::NOT_FOUND),
            (EngineError::ConstraintViolation(key), StatusCode::CONFLICT),
            (
                EngineError::StorageUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::NetworkUnavailable("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn bad_request_response() {
        let response = AppError::BadRequest("too many".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
