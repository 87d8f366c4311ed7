//! Scoutboard error types

use std::time::Duration;

/// Scoutboard error types.
///
/// `Clone` because a single failed fetch is handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoutboardError {
    // Network/upstream errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("fetch failed: {0}")]
    Fetch(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    // Caller errors
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ScoutboardError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Transport failures, rate limiting, and 5xx responses are transient;
    /// everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScoutboardError {
    fn from(err: serde_json::Error) -> Self {
        ScoutboardError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for ScoutboardError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ScoutboardError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ScoutboardError::Json(err.to_string())
        } else {
            ScoutboardError::Http(err.to_string())
        }
    }
}

/// Result type alias for Scoutboard operations
pub type Result<T> = std::result::Result<T, ScoutboardError>;
