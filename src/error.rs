// Client error types
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::http::Attempt;
use crate::session::SessionError;

/// Errors surfaced by the request pipeline and everything built on it.
///
/// Only `Unauthorized` carries a side effect (handled inside the pipeline);
/// every other variant is propagated untouched for the calling form to report.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized { attempt: Attempt, body: Value },

    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid path segment: '{0}'")]
    InvalidPath(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No lookup endpoint registered for field '{0}'")]
    UnknownLookup(String),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// HTTP status the error came from, if it came from a response at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Unauthorized { .. } => "UNAUTHORIZED",
            ClientError::Status { status, .. } => match status {
                400 => "BAD_REQUEST",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                429 => "TOO_MANY_REQUESTS",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::InvalidUrl(_) => "INVALID_URL",
            ClientError::InvalidPath(_) => "INVALID_PATH",
            ClientError::InvalidHeader(_) => "INVALID_HEADER",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::UnknownLookup(_) => "UNKNOWN_LOOKUP",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Session(_) => "SESSION_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ClientError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Build a `Status` error from a response body, pulling a human message
    /// out of the common backend shapes (`message`, `title`, `error`).
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = ["message", "title", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| body.as_str().map(str::to_string))
            .unwrap_or_else(|| "Request failed".to_string());

        ClientError::Status { status, message, body }
    }

    /// Convert to a JSON value for CLI output
    pub fn to_json(&self) -> Value {
        let mut response = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        if let ClientError::Validation { field_errors, .. } = self {
            response["field_errors"] = serde_json::json!(field_errors);
        }

        response
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
