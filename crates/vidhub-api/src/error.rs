// Error taxonomy and the single point converting failures to responses
//
// Every handler and service bubbles an ApiError; the IntoResponse impl below
// is the only place a failure becomes a wire response, shaped as
// {"status": <code>, "message": <text>}. Internal and upstream details are
// logged server-side and never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for request handling
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures a request can end in, each with an HTTP-status-like severity
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required fields
    #[error("{0}")]
    Validation(String),

    /// Duplicate username/email
    #[error("{0}")]
    Conflict(String),

    /// Missing/invalid/expired token or bad credentials
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but not the resource owner
    #[error("{0}")]
    Authorization(String),

    /// Resource id does not resolve
    #[error("{0}")]
    NotFound(String),

    /// Media store or database operation failed
    #[error("{0}")]
    Upstream(String),

    /// Anything else; surfaced as a generic server failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        ApiError::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        ApiError::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        ApiError::Upstream(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<vidhub_media::MediaError> for ApiError {
    fn from(e: vidhub_media::MediaError) -> Self {
        tracing::error!("Media store operation failed: {}", e);
        ApiError::Upstream("Media store operation failed".to_string())
    }
}

/// Error response wire shape
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status code of the failure
    pub status: u16,
    /// Human-readable message; never carries stack data
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(e) => {
                tracing::error!("Internal error handling request: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                status: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::authorization("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::upstream("x").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let response = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
