//! Desired state and persisted state of a managed PAT

use common::Secret;

use azure_auth::{AZURE_DEVOPS_SCOPE, AppIdentity, Flow, PublicCredential, ToggleWorkaround};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Desired state for one managed PAT, supplied fresh on every operation.
///
/// `pat_name` and `pat_scopes` are replace-triggering: any change forces
/// delete + recreate upstream, never an in-place update.
#[derive(Debug, Clone)]
pub struct PatSpec {
    /// Display name of the PAT to create
    pub pat_name: String,
    /// PAT scopes separated by whitespace, e.g. `vso.code vso.build_execute`
    pub pat_scopes: String,
    /// PAT management endpoint, e.g. `https://vssps.dev.azure.com/{org}/_apis/tokens/pats`
    pub pat_endpoint: String,

    /// Client ID of the registered application
    pub app_client_id: String,
    /// Azure AD authority URL
    pub authority: String,
    /// Client secret, required when the registration is confidential
    pub app_client_secret: Option<Secret<String>>,
    /// Whether the app registration allows public clients
    pub is_app_registration_public: bool,

    /// Azure DevOps user for the password grant
    pub devops_user: String,
    /// Azure DevOps password for the password grant
    pub devops_password: Secret<String>,

    /// Temporary public-flip workaround settings
    pub toggle: ToggleWorkaround,
}

impl PatSpec {
    pub(crate) fn identity(&self) -> AppIdentity {
        AppIdentity {
            client_id: self.app_client_id.clone(),
            authority: self.authority.clone(),
            scope: AZURE_DEVOPS_SCOPE.into(),
        }
    }

    /// Resolve the token-acquisition flow once per operation. Fails fast
    /// before any network call when the confidential flow lacks a secret.
    pub(crate) fn flow(&self) -> Result<Flow> {
        let credential = PublicCredential {
            username: self.devops_user.clone(),
            password: self.devops_password.clone(),
        };
        Ok(Flow::select(
            self.is_app_registration_public,
            credential,
            self.app_client_secret.clone(),
            self.toggle,
        )?)
    }
}

/// Persisted state the calling framework retains for a managed PAT.
///
/// `id: None` means nothing was created (or the record was imported and
/// later removed). The `token` is write-once: the API has no read-back, so
/// this state is the only place the value exists after creation.
#[derive(Clone, Serialize, Deserialize)]
pub struct PatState {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scopes: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub valid_from: String,
    #[serde(default)]
    pub valid_to: String,
}

impl PatState {
    pub fn from_record(record: devops_pat::PatRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            scopes: record.scopes,
            token: record.token,
            valid_from: record.valid_from,
            valid_to: record.valid_to,
        }
    }

    /// Placeholder state keyed only by the external identifier. Every other
    /// field stays unset until a real read capability exists (none does).
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: String::new(),
            scopes: String::new(),
            token: String::new(),
            valid_from: String::new(),
            valid_to: String::new(),
        }
    }
}

impl std::fmt::Debug for PatState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatState")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("scopes", &self.scopes)
            .field("token", &"[REDACTED]")
            .field("valid_from", &self.valid_from)
            .field("valid_to", &self.valid_to)
            .finish()
    }
}
