//! Configuration types and loading
//!
//! Secrets never live in the TOML. The DevOps password resolves from the
//! AZURE_DEVOPS_PASSWORD env var or `devops.password_file`; the app client
//! secret from APP_CLIENT_SECRET or `app.client_secret_file`. Env vars win.

use std::path::{Path, PathBuf};

use azure_auth::ToggleWorkaround;
use common::Secret;
use pat_resource::PatSpec;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub devops: DevopsConfig,
    pub pat: PatConfig,
    #[serde(default)]
    pub workaround: WorkaroundConfig,
}

/// Azure AD application registration settings
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    /// Azure AD authority URL, e.g. `https://login.microsoftonline.com/{tenant}`
    pub authority: String,
    /// Whether the registration allows public clients. Confidential
    /// registrations require a client secret.
    #[serde(default = "default_true")]
    pub is_public: bool,
    /// Path to a file containing the client secret (alternative to APP_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
}

/// Azure DevOps user for the resource-owner password grant
#[derive(Debug, Deserialize)]
pub struct DevopsConfig {
    pub user: String,
    /// Path to a file containing the password (alternative to AZURE_DEVOPS_PASSWORD)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
}

/// The PAT to manage
#[derive(Debug, Deserialize)]
pub struct PatConfig {
    pub name: String,
    /// Scopes separated by whitespace, e.g. `vso.code vso.build_execute`
    pub scopes: String,
    /// PAT management endpoint, e.g. `https://vssps.dev.azure.com/{org}/_apis/tokens/pats`
    pub endpoint: String,
    /// Where the provisioner persists the created PAT's state
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

/// Temporary public-flip workaround settings
#[derive(Debug, Default, Deserialize)]
pub struct WorkaroundConfig {
    /// Flip the registration public via the az CLI around token acquisition
    #[serde(default)]
    pub switch_private_public: bool,
    /// Propagation wait in seconds; 0 means the built-in default
    #[serde(default)]
    pub wait_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_state_file() -> PathBuf {
    PathBuf::from("pat-state.json")
}

impl Config {
    /// Load configuration from a TOML file, then resolve secrets.
    ///
    /// Secret resolution order, per secret:
    /// 1. Env var (AZURE_DEVOPS_PASSWORD / APP_CLIENT_SECRET)
    /// 2. The configured `*_file` path
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        for (field, value) in [
            ("app.authority", &config.app.authority),
            ("pat.endpoint", &config.pat.endpoint),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{field} must start with http:// or https://, got: {value}"
                )));
            }
        }

        if config.pat.name.is_empty() {
            return Err(common::Error::Config("pat.name must not be empty".into()));
        }
        if config.pat.scopes.is_empty() {
            return Err(common::Error::Config("pat.scopes must not be empty".into()));
        }

        config.devops.password =
            resolve_secret("AZURE_DEVOPS_PASSWORD", config.devops.password_file.as_deref())?;
        config.app.client_secret =
            resolve_secret("APP_CLIENT_SECRET", config.app.client_secret_file.as_deref())?;

        if config.app.is_public && config.devops.password.is_none() {
            return Err(common::Error::Config(
                "public flow requires a DevOps password: set AZURE_DEVOPS_PASSWORD or devops.password_file".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or PAT_PROVISIONER_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("PAT_PROVISIONER_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("pat-provisioner.toml")
    }

    /// Desired state handed to the orchestrator.
    pub fn to_spec(&self) -> PatSpec {
        PatSpec {
            pat_name: self.pat.name.clone(),
            pat_scopes: self.pat.scopes.clone(),
            pat_endpoint: self.pat.endpoint.clone(),
            app_client_id: self.app.client_id.clone(),
            authority: self.app.authority.clone(),
            app_client_secret: self.app.client_secret.clone(),
            is_app_registration_public: self.app.is_public,
            devops_user: self.devops.user.clone(),
            devops_password: self
                .devops
                .password
                .clone()
                .unwrap_or_else(|| Secret::new(String::new())),
            toggle: ToggleWorkaround {
                enabled: self.workaround.switch_private_public,
                wait_secs: self.workaround.wait_secs,
            },
        }
    }
}

/// Env var first, then the file path; a whitespace-only value counts as unset.
fn resolve_secret(
    env_var: &str,
    file: Option<&Path>,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    if let Some(file) = file {
        let value = std::fs::read_to_string(file).map_err(|e| {
            common::Error::Config(format!("failed to read {}: {e}", file.display()))
        })?;
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    Ok(None)
}
