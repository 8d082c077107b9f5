use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lyricmux_core::CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error, please try again later.")]
    Internal(#[source] CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuery { reason } => Self::BadRequest(reason),
            other => Self::Internal(other),
        }
    }
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!("Request failed: {source}");
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_is_bad_request() {
        let err = ApiError::from(CoreError::InvalidQuery {
            reason: "'title' parameter is required.".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "'title' parameter is required.");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = ApiError::from(CoreError::Internal {
            reason: "fetch pool unavailable".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error, please try again later.");
    }
}
