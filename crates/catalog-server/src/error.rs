//! Server-wide error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for server operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    Common(#[from] catalog_common::CatalogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            },
            AppError::NotFound(ref message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Validation(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Conflict(ref message) => (StatusCode::CONFLICT, message.clone()),
            AppError::Unavailable(ref message) => {
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            },
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An IO error occurred".to_string(),
                )
            },
            AppError::Common(ref e) => {
                tracing::error!("Catalog error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            },
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = AppError::NotFound("missing".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::Conflict("dup".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AppError::Unavailable("busy".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
