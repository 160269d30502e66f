//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::Error;

/// An error answered to the HTTP caller.
///
/// Messages are safe to show to end users; file system paths and other
/// internals stay in the server log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Machine-readable kind.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// A `400 Bad Request`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            message: message.into(),
        }
    }
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        if err.is_dataset_error() {
            let message = match err {
                Error::DatasetTimeout { .. } | Error::MalformedRecord { .. } => {
                    format!("dataset unavailable: {err}")
                }
                _ => "dataset unavailable: could not be read".to_string(),
            };
            Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                kind: err.kind(),
                message,
            }
        } else {
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                kind: "internal",
                message: "Internal server error".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dataset_read_hides_path() {
        let err = Error::DatasetRead {
            path: PathBuf::from("/secret/adsb.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let api = ApiError::from(&err);

        assert_eq!(api.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.kind, "dataset_read");
        assert!(!api.message.contains("/secret"));
    }

    #[test]
    fn test_timeout_is_service_unavailable() {
        let api = ApiError::from(&Error::DatasetTimeout { timeout_ms: 100 });
        assert_eq!(api.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(api.message.contains("timed out"));
    }

    #[test]
    fn test_malformed_record_message_includes_line() {
        let api = ApiError::from(&Error::malformed(12, "latitude present without longitude"));
        assert!(api.message.contains("line 12"));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let api = ApiError::from(&Error::internal("boom"));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
    }

    #[test]
    fn test_bad_request() {
        let api = ApiError::bad_request("limit must be a positive integer");
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.kind, "bad_request");
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
