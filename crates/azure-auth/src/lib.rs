//! Azure AD token acquisition for PAT management
//!
//! Obtains an OAuth bearer token for the Azure DevOps resource using one of
//! two flows, selected once per operation:
//! 1. Public client: resource-owner password grant (username + password)
//! 2. Confidential client: client-credentials grant (shared secret)
//!
//! The public path optionally performs the app-registration toggle
//! workaround: flip the registration to "public client allowed" via the
//! `az` CLI, wait for propagation, acquire the token, then flip it back.
//! The flip back runs on every exit path, success or failure.
//!
//! Tokens are valid for a single operation and never persisted. This crate
//! has no dependency on the PAT API client — it can be tested standalone.

pub mod cli;
pub mod error;
pub mod token;
pub mod types;

pub use cli::{AppRegistrationCli, AzCli, CliError};
pub use error::{Error, Result};
pub use token::{TokenResponse, acquire_token};
pub use types::{
    AZURE_DEVOPS_SCOPE, AccessToken, AppIdentity, ConfidentialCredential,
    DEFAULT_PROPAGATION_WAIT_SECS, Flow, PublicCredential, ToggleWorkaround,
};
