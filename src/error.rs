use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message used when a rejected login carries no error payload.
pub const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";
/// Message used when the backend sends no usable error payload.
pub const DEFAULT_HTTP_ERROR: &str = "Request failed";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The credentials were rejected by the login endpoint.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The token was missing, invalid or expired. The session has been cleared.
    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    /// The backend answered with a 5xx status.
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// The backend answered with any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// No response at all: backend unreachable or the request timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A form failed validation before it was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The persisted token could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The HTTP status behind this error, when the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            AppError::Server { status, .. } | AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Server { .. })
    }

    /// The message a view shows to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Authentication(msg)
            | AppError::Unauthorized(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Server { message, .. } | AppError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<sonic_rs::Error> for AppError {
    fn from(e: sonic_rs::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string().trim().to_string())
    }
}

/// The error body the backend sends with a non-success status.
#[derive(Deserialize, Debug, Default)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Pulls the server's error message out of a response body, if there is one.
pub fn error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let payload: ErrorPayload = sonic_rs::from_slice(body).ok()?;
    payload
        .error
        .or(payload.message)
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
}
