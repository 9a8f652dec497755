use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tonic::Code;

/// Failures surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is not a valid `{key, value}` document
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("key not found")]
    NotFound,

    /// Cache service call failed for any reason other than a missing key
    #[error("cache service call failed: {0}")]
    Rpc(tonic::Status),
}

impl ApiError {
    /// Translate a failed Get; only Get can turn `NotFound` into a 404
    pub fn from_get_status(status: tonic::Status) -> Self {
        if status.code() == Code::NotFound {
            ApiError::NotFound
        } else {
            ApiError::Rpc(status)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Rpc(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tonic::Status> for ApiError {
    fn from(status: tonic::Status) -> Self {
        ApiError::Rpc(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = format!("{}\n", status.canonical_reason().unwrap_or_default());
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
