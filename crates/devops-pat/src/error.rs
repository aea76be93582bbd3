//! Error types for PAT API operations

/// Errors from the PAT management API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("PAT API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid PAT API response: {0}")]
    InvalidResponse(String),
}

/// Result alias for PAT operations.
pub type Result<T> = std::result::Result<T, Error>;
