use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure reported by the object store, carried through to the HTTP layer.
///
/// The status is whatever the store answered with (404, 403, ...). The message
/// is for logs only and never reaches the client.
#[derive(Debug, Error)]
#[error("store error {status}: {message}")]
pub struct StoreError {
    pub status: StatusCode,
    pub message: String,
}

impl StoreError {
    /// Create a new StoreError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Build from a raw status code, falling back to 502 for values outside
    /// the valid HTTP range.
    pub fn from_status_code(code: u16, msg: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, msg)
    }

    /// Shortcut for 502 Bad Gateway, used when the store could not be reached
    /// or answered with something unusable.
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, msg)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, "{}", self.message);

        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status;
        response
    }
}
