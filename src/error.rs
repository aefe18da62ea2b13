use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::api::models::{ErrorBody, InternalErrorBody};

/// Failures that end a search request before a result is produced.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing or invalid authorization token")]
    AuthMissing,

    #[error("Invalid authentication token: {0}")]
    AuthInvalid(String),

    #[error("User not found in token")]
    UserNotFound,

    #[error("Server configuration error: missing {0}")]
    ServerMisconfigured(String),

    #[error("Invalid query: {0}")]
    QueryInvalid(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            SearchError::AuthMissing | SearchError::AuthInvalid(_) | SearchError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            SearchError::QueryInvalid(_) => StatusCode::BAD_REQUEST,
            SearchError::ServerMisconfigured(_) | SearchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code, where the error has one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            SearchError::AuthMissing => Some("AUTH_MISSING"),
            SearchError::AuthInvalid(_) => Some("AUTH_INVALID"),
            SearchError::UserNotFound => Some("USER_NOT_FOUND"),
            SearchError::QueryInvalid(_) => Some("QUERY_INVALID"),
            SearchError::Internal(_) => Some("INTERNAL_ERROR"),
            SearchError::ServerMisconfigured(_) => None,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            SearchError::Internal(detail) => {
                tracing::error!(error = %detail, "search request failed unexpectedly");
                internal_error_response()
            }
            SearchError::ServerMisconfigured(missing) => {
                tracing::error!(missing = %missing, "identity provider is not configured");
                (
                    status,
                    Json(ErrorBody {
                        error: "Server configuration error".to_string(),
                        code: None,
                    }),
                )
                    .into_response()
            }
            // The identity provider's reason stays in the logs.
            SearchError::AuthInvalid(reason) => {
                tracing::info!(reason = %reason, "rejected search token");
                (
                    status,
                    Json(ErrorBody {
                        error: "Invalid authentication token".to_string(),
                        code: self.code(),
                    }),
                )
                    .into_response()
            }
            _ => (
                status,
                Json(ErrorBody {
                    error: self.to_string(),
                    code: self.code(),
                }),
            )
                .into_response(),
        }
    }
}

/// Generic 500 body with an empty result list and no internal detail.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(InternalErrorBody {
            success: false,
            error: "Internal server error".to_string(),
            code: "INTERNAL_ERROR",
            results: Vec::new(),
        }),
    )
        .into_response()
}

/// Failures of the upstream manager call. Never surfaced to the caller; they
/// select the fallback results instead.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("manager request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("manager returned HTTP {0}")]
    Status(u16),

    #[error("manager request cancelled")]
    Cancelled,

    #[error("manager request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("manager returned malformed JSON: {0}")]
    InvalidJson(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_codes() {
        let cases = [
            (SearchError::AuthMissing, StatusCode::UNAUTHORIZED, Some("AUTH_MISSING")),
            (
                SearchError::AuthInvalid("expired".into()),
                StatusCode::UNAUTHORIZED,
                Some("AUTH_INVALID"),
            ),
            (SearchError::UserNotFound, StatusCode::UNAUTHORIZED, Some("USER_NOT_FOUND")),
            (
                SearchError::QueryInvalid("empty".into()),
                StatusCode::BAD_REQUEST,
                Some("QUERY_INVALID"),
            ),
            (
                SearchError::ServerMisconfigured("IDENTITY_KEY".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
            ),
            (
                SearchError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("INTERNAL_ERROR"),
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status(), status, "{err}");
            assert_eq!(err.code(), code, "{err}");
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_upstream_error_messages() {
        assert_eq!(
            UpstreamError::Timeout(Duration::from_millis(5000)).to_string(),
            "manager request timed out after 5000ms"
        );
        assert_eq!(UpstreamError::Status(503).to_string(), "manager returned HTTP 503");
    }
}
