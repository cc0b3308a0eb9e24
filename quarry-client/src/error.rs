//! Error types for the Quarry client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Quarry client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code; `message` is the server's
    /// `error` envelope field and should be surfaced to the user as-is.
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Transient errors are worth silently retrying on the next poll:
    /// network failures and server-side 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
