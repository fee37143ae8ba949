//! Error types for server operations.
//!
//! `ConfigurationError` is fatal and stops the process before it binds.
//! `ApiError` is the boundary type for request handlers: it turns domain
//! failures into JSON error bodies and logs them.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_conversation::ConversationError;
use rootcause::Report;
use serde::Serialize;
use std::fmt;

/// Startup configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Configuration sources could not be read or deserialized.
    Load { reason: String },
    /// A required credential is not set.
    MissingCredential { variable: &'static str },
    /// A value is out of range.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { reason } => write!(f, "failed to load configuration: {reason}"),
            Self::MissingCredential { variable } => {
                write!(f, "{variable} not found; set it in the environment or a .env file")
            }
            Self::Invalid { field, reason } => {
                write!(f, "invalid configuration value '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was not a JSON object with a string `message`.
    MalformedBody { reason: String },
    /// The conversation service rejected or failed the operation.
    Conversation(Report<ConversationError>),
}

impl From<Report<ConversationError>> for ApiError {
    fn from(report: Report<ConversationError>) -> Self {
        Self::Conversation(report)
    }
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            Self::Conversation(report) if report.current_context().is_client_error() => {
                StatusCode::BAD_REQUEST
            }
            Self::Conversation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message placed in the response body.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MalformedBody { reason } => format!("Invalid request body: {reason}"),
            Self::Conversation(report) => report.current_context().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match &self {
            Self::Conversation(report) if status.is_server_error() => {
                tracing::error!(error = %report, "Chat request failed");
            }
            _ => {
                tracing::warn!(error = %message, "Rejected chat request");
            }
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_bad_request() {
        let err = ApiError::from(Report::from(ConversationError::invalid_request(
            "No message provided",
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "No message provided");
    }

    #[test]
    fn upstream_failure_maps_to_internal_error() {
        let err = ApiError::from(Report::from(ConversationError::UpstreamFailure {
            reason: "LLM request timed out".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("timed out"));
    }

    #[test]
    fn malformed_body_maps_to_bad_request() {
        let err = ApiError::MalformedBody {
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Invalid request body"));
    }

    #[test]
    fn missing_credential_names_variable() {
        let err = ConfigurationError::MissingCredential {
            variable: "GROQ_API_KEY",
        };
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
