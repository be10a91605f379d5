// Error types for the media store client

use thiserror::Error;

/// Result type alias for media store operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors that can occur talking to the media store
#[derive(Debug, Error)]
pub enum MediaError {
    /// Client is misconfigured (missing env vars, bad base URL)
    #[error("Media store configuration error: {0}")]
    Config(String),

    /// Local staged file could not be read or removed
    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure reaching the provider
    #[error("Media store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Media store rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Provider answered 2xx but the body did not parse
    #[error("Unexpected media store response: {0}")]
    InvalidResponse(String),
}

impl MediaError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        MediaError::Config(msg.into())
    }
}
