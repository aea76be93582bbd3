//! App-registration toggle via the `az` CLI
//!
//! There is no confidential-client API for the password grant, so the
//! workaround flips the registration's "allow public client" flag through
//! the local `az` binary around token acquisition:
//!
//! ```text
//! az ad app update --id {app_id} --is-fallback-public-client {true|false}
//! ```
//!
//! The capability is behind a small trait so tests substitute a fake and
//! never spawn a real process.

use tokio::process::Command;
use tracing::debug;

/// Errors from invoking the app registration CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to invoke app registration CLI: {0}")]
    Spawn(String),

    #[error("app registration CLI exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
}

/// Capability to mutate an app registration's "allow public client" flag.
///
/// Callers treat failure as non-fatal: the workaround is best-effort and a
/// flag that never propagated surfaces later as a token-acquisition failure.
pub trait AppRegistrationCli {
    fn set_app_public(
        &self,
        app_id: &str,
        public: bool,
    ) -> impl Future<Output = Result<(), CliError>> + Send;
}

/// Argument vector for the update command, split out so the exact shape is
/// testable without spawning anything.
fn update_args(app_id: &str, public: bool) -> [&str; 7] {
    [
        "ad",
        "app",
        "update",
        "--id",
        app_id,
        "--is-fallback-public-client",
        if public { "true" } else { "false" },
    ]
}

/// The real bridge: shells out to the Azure CLI.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl AzCli {
    pub fn new() -> Self {
        Self::with_program("az")
    }

    /// Override the binary name/path (used by tests and unusual installs).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRegistrationCli for AzCli {
    async fn set_app_public(&self, app_id: &str, public: bool) -> Result<(), CliError> {
        debug!(app_id, public, program = %self.program, "updating app registration public flag");
        let output = Command::new(&self.program)
            .args(update_args(app_id, public))
            .output()
            .await
            .map_err(|e| CliError::Spawn(format!("could not run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CliError::Exit {
                code: output.status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_args_for_public() {
        assert_eq!(
            update_args("11111111-2222-3333-4444-555555555555", true),
            [
                "ad",
                "app",
                "update",
                "--id",
                "11111111-2222-3333-4444-555555555555",
                "--is-fallback-public-client",
                "true",
            ]
        );
    }

    #[test]
    fn update_args_for_private() {
        let args = update_args("app-x", false);
        assert_eq!(args[6], "false");
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let cli = AzCli::with_program("definitely-not-an-installed-binary");
        let err = cli.set_app_public("app-x", true).await.unwrap_err();
        assert!(matches!(err, CliError::Spawn(_)), "got: {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_exit_error() {
        // `false` ignores its arguments and exits 1
        let cli = AzCli::with_program("false");
        let err = cli.set_app_public("app-x", true).await.unwrap_err();
        match err {
            CliError::Exit { code, .. } => assert_eq!(code, Some(1)),
            other => panic!("expected exit error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_ok() {
        // `true` ignores its arguments and exits 0
        let cli = AzCli::with_program("true");
        cli.set_app_public("app-x", false).await.unwrap();
    }
}
