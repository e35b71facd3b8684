//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use services::{ErrorKind, ServiceError};

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"error": {"code", "message"}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A storefront operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request itself was malformed.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Service(err) => err.kind(),
            ApiError::BadRequest(_) => ErrorKind::ValidationFailed,
        }
    }
}

/// HTTP status for an error category.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailed | ErrorKind::InvalidTransition => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        metrics::counter!("http_errors_total", "code" => kind.code()).increment(1);
        let message = match &self {
            ApiError::Service(err) => {
                if kind == ErrorKind::Internal {
                    tracing::error!(error = %err, "internal server error");
                }
                err.public_message()
            }
            ApiError::BadRequest(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": { "code": kind.code(), "message": message }
        });
        (status_for(kind), axum::Json(body)).into_response()
    }
}
