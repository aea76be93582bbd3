//! Error types for resource orchestration

/// Errors from a lifecycle operation, tagged by the step that failed.
///
/// Nothing is retried internally — retry is the caller's concern (a
/// declarative re-apply). No variant is fatal beyond the single resource.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token acquisition failed: {0}")]
    Auth(#[from] azure_auth::Error),

    #[error("PAT API operation failed: {0}")]
    Api(#[from] devops_pat::Error),
}

impl Error {
    /// True when the operation was rejected before any network call
    /// (e.g. confidential flow selected without a client secret).
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Auth(azure_auth::Error::Validation(_)))
    }
}

/// Result alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;
