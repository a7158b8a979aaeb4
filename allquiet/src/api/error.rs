use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Resource not found")]
    NotFound,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed, check the API key")]
    AuthError,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}
