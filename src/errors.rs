use crate::services::BrowseError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

/// Validation failures are the caller's fault; store failures are upstream.
impl From<BrowseError> for AppError {
    fn from(err: BrowseError) -> Self {
        let status = match err {
            BrowseError::InvalidPath { .. } | BrowseError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            BrowseError::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        AppError::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_should_map_validation_errors_to_bad_request() {
        let err = BrowseError::InvalidPath {
            path: "../etc".into(),
            reason: "path segments must not be `..`",
        };

        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert!(app.message.contains("../etc"));
    }

    #[test]
    fn test_should_map_store_failures_to_bad_gateway() {
        let err = BrowseError::StoreUnavailable(StoreError::unavailable(
            "list_flat",
            "connection refused",
        ));

        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::BAD_GATEWAY);
        assert!(app.message.contains("connection refused"));
    }
}
