//! Error types for token acquisition

/// Errors from flow selection and token acquisition.
///
/// CLI bridge failures are deliberately absent: the toggle workaround is
/// best-effort, so [`crate::cli::CliError`] is logged and swallowed rather
/// than surfaced here (a missing propagation shows up later as `Auth`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("token request rejected: {0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Result alias for token acquisition.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_detail() {
        let err = Error::Auth("AADSTS50126: invalid credentials".into());
        assert!(err.to_string().contains("AADSTS50126"));

        let err = Error::Validation("no client secret is set".into());
        assert!(err.to_string().starts_with("validation error:"));
    }
}
