//! API Error Types
//!
//! Maps edit, content and auth failures to HTTP responses with a stable
//! error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::admin::EditError;
use crate::content::{ContentError, RemoteError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body or parameters rejected
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or unknown admin session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An edit could not be applied
    #[error("{0}")]
    Edit(#[from] EditError),

    /// Content store failure
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Edit(e) => match e {
                EditError::IndexOutOfRange { .. } => (StatusCode::NOT_FOUND, "INDEX_OUT_OF_RANGE"),
                EditError::AlbumNotFound(_) => (StatusCode::NOT_FOUND, "ALBUM_NOT_FOUND"),
                EditError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
                EditError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                EditError::Media(_) => (StatusCode::BAD_REQUEST, "MEDIA_ERROR"),
            },
            ApiError::Content(ContentError::Remote(RemoteError::NotConfigured)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "REMOTE_NOT_CONFIGURED")
            }
            ApiError::Content(ContentError::Remote(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "REMOTE_ERROR")
            }
            ApiError::Content(ContentError::Corrupted(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT")
            }
            ApiError::Content(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONTENT_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_errors_map_to_client_statuses() {
        let err = ApiError::from(EditError::IndexOutOfRange {
            collection: "slide",
            index: 3,
            len: 1,
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(EditError::MissingField("image"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remote_errors_are_unavailable() {
        let err = ApiError::from(ContentError::Remote(RemoteError::NotConfigured));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
