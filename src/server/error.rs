//! Mapping of core errors to HTTP responses
//!
//! The body is always `{"error": ..., "details": ...}`. Execution failures
//! also carry ufw's stderr and, when the stderr matches a known pattern, a
//! human-readable hint with suggestions.

use crate::core::error::{Error, UfwErrorPattern};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
                stderr: None,
                hint: None,
                suggestions: Vec::new(),
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "API key required")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Invalid API key")
    }

    /// Maps a core error; `context` names the failed operation for 5xx
    /// responses (for example "Failed to add allow rule").
    pub fn from_core(context: &str, err: &Error) -> Self {
        let mut api_error = match err {
            _ if err.is_client_error() => Self::new(StatusCode::BAD_REQUEST, "Invalid request"),
            Error::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Rule not found"),
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, context),
        }
        .with_details(err.to_string());

        if let Some(stderr) = err.stderr() {
            if let Some(translation) = UfwErrorPattern::match_error(stderr) {
                api_error.body.hint = Some(translation.user_message);
                api_error.body.suggestions = translation.suggestions;
            }
            api_error.body.stderr = Some(stderr.trim_end().to_string());
        }

        api_error
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
