/*
[INPUT]:  Error sources (HTTP, API status codes, serialization, configuration)
[OUTPUT]: Structured error types with context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Reported when Trello answers 429 without a `Retry-After` header
pub const DEFAULT_RATE_LIMIT_RETRY_SECS: u64 = 10;

/// Main error type for the Trello adapter
#[derive(Error, Debug)]
pub enum TrelloError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Key/token missing or rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Board, list or card does not exist (or is not visible to the token)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Request timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl TrelloError {
    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, TrelloError::Authentication { .. })
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TrelloError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status: StatusCode, body: impl Into<String>, retry_after: Option<u64>) -> Self {
        let body = body.into();
        match status {
            StatusCode::UNAUTHORIZED => TrelloError::Authentication { message: body },
            StatusCode::NOT_FOUND => TrelloError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => TrelloError::RateLimit {
                retry_after: retry_after.unwrap_or(DEFAULT_RATE_LIMIT_RETRY_SECS),
            },
            _ => TrelloError::api_error(status, body),
        }
    }
}

/// Result type alias for Trello operations
pub type Result<T> = std::result::Result<T, TrelloError>;
