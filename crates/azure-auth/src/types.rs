//! Identity, credential, and flow-selection types
//!
//! Everything here is supplied fresh on each create/delete operation —
//! nothing is cached between operations.

use std::fmt;
use std::time::Duration;

use common::Secret;

use crate::error::{Error, Result};

/// OAuth scope for the Azure DevOps resource (fixed well-known application ID)
pub const AZURE_DEVOPS_SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798/.default";

/// Default propagation wait after flipping the app registration public,
/// in seconds. Applied when the configured wait is zero.
pub const DEFAULT_PROPAGATION_WAIT_SECS: u64 = 7;

/// Identifies the Azure AD application and target API scope.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    /// Client ID of the registered application
    pub client_id: String,
    /// Azure AD authority URL, e.g. `https://login.microsoftonline.com/{tenant}`
    pub authority: String,
    /// Resource scope requested with the token, normally [`AZURE_DEVOPS_SCOPE`]
    pub scope: String,
}

impl AppIdentity {
    /// Token endpoint for the v2.0 protocol under this authority.
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority.trim_end_matches('/'))
    }
}

/// Resource-owner credential pair for the public-client flow.
#[derive(Debug, Clone)]
pub struct PublicCredential {
    pub username: String,
    pub password: Secret<String>,
}

/// Shared secret for the confidential-client flow.
#[derive(Debug, Clone)]
pub struct ConfidentialCredential {
    pub client_secret: Secret<String>,
}

/// Governs the temporary flip of the app registration to "public client
/// allowed" around token acquisition.
#[derive(Debug, Clone, Copy)]
pub struct ToggleWorkaround {
    pub enabled: bool,
    /// Seconds to wait for the flip to propagate. Zero means "use default".
    pub wait_secs: u64,
}

impl ToggleWorkaround {
    /// Workaround disabled entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            wait_secs: 0,
        }
    }

    /// Effective propagation wait. A configured wait of zero falls back to
    /// [`DEFAULT_PROPAGATION_WAIT_SECS`] — it never means "no wait".
    pub fn effective_wait(&self) -> Duration {
        let secs = if self.wait_secs == 0 {
            DEFAULT_PROPAGATION_WAIT_SECS
        } else {
            self.wait_secs
        };
        Duration::from_secs(secs)
    }
}

/// Opaque bearer token, valid for a single operation.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub scope: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Token-acquisition strategy, resolved once at the start of each operation
/// instead of branching on a boolean at every call site.
#[derive(Debug, Clone)]
pub enum Flow {
    /// Resource-owner password grant, with the optional toggle workaround.
    Public {
        credential: PublicCredential,
        toggle: ToggleWorkaround,
    },
    /// Client-credentials grant. No toggle workaround applies.
    ///
    /// Known limitation carried over from the source behavior: PAT issuance
    /// through this flow is not supported by the downstream API today; the
    /// grant itself works but deployments route through the public flow
    /// (with the toggle workaround when the registration is confidential).
    Confidential { credential: ConfidentialCredential },
}

impl Flow {
    /// Resolve the flow from configuration.
    ///
    /// A registration marked public uses the password grant. A confidential
    /// registration requires a client secret; a missing secret fails fast
    /// here, before any network call is made.
    pub fn select(
        is_public: bool,
        credential: PublicCredential,
        client_secret: Option<Secret<String>>,
        toggle: ToggleWorkaround,
    ) -> Result<Self> {
        if is_public {
            return Ok(Flow::Public { credential, toggle });
        }
        let client_secret = client_secret.ok_or_else(|| {
            Error::Validation(
                "app registration is confidential but no client secret is set".into(),
            )
        })?;
        Ok(Flow::Confidential {
            credential: ConfidentialCredential { client_secret },
        })
    }
}
