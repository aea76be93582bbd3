//! OAuth token acquisition against the Azure AD v2.0 endpoint
//!
//! Two grants, dispatched once on the selected [`Flow`]:
//! 1. Resource-owner password grant (public client), optionally wrapped in
//!    the toggle workaround
//! 2. Client-credentials grant (confidential client)
//!
//! Both POST form-encoded bodies to `{authority}/oauth2/v2.0/token`.

use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::AppRegistrationCli;
use crate::error::{Error, Result};
use crate::types::{
    AccessToken, AppIdentity, ConfidentialCredential, Flow, PublicCredential, ToggleWorkaround,
};

/// Response from the token endpoint for both grants.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until expiry. Informational only — tokens here are used for
    /// exactly one downstream call and never cached.
    #[serde(default)]
    pub expires_in: u64,
}

/// Acquire a bearer token for the given identity using the selected flow.
///
/// The identity is supplied fresh per operation; nothing is cached between
/// calls. The sleep inside the toggle workaround suspends only the calling
/// task, never the runtime.
pub async fn acquire_token<C: AppRegistrationCli>(
    client: &reqwest::Client,
    cli: &C,
    identity: &AppIdentity,
    flow: &Flow,
) -> Result<AccessToken> {
    match flow {
        Flow::Public { credential, toggle } => {
            with_public_client(
                cli,
                &identity.client_id,
                toggle,
                password_grant(client, identity, credential),
            )
            .await
        }
        Flow::Confidential { credential } => {
            client_credentials_grant(client, identity, credential).await
        }
    }
}

/// Run `op` with the app registration temporarily flipped to public.
///
/// The flip back to private runs on every exit path: once the flip to
/// public was attempted, the registration must not stay public just because
/// the grant failed. `op` is only polled after the propagation wait.
async fn with_public_client<C: AppRegistrationCli, T>(
    cli: &C,
    app_id: &str,
    toggle: &ToggleWorkaround,
    op: impl Future<Output = T>,
) -> T {
    if !toggle.enabled {
        return op.await;
    }

    info!(app_id, "toggle workaround: making app registration public for token acquisition");
    set_public_best_effort(cli, app_id, true).await;

    let wait = toggle.effective_wait();
    info!(
        wait_secs = wait.as_secs(),
        "toggle workaround: waiting for propagation"
    );
    tokio::time::sleep(wait).await;

    let out = op.await;

    info!(app_id, "toggle workaround: restoring app registration to private");
    set_public_best_effort(cli, app_id, false).await;

    out
}

/// Invoke the CLI bridge, logging failures instead of propagating them.
/// A toggle that never landed surfaces later as a grant failure.
async fn set_public_best_effort<C: AppRegistrationCli>(cli: &C, app_id: &str, public: bool) {
    if let Err(e) = cli.set_app_public(app_id, public).await {
        warn!(app_id, public, error = %e, "app registration toggle failed, continuing");
    }
}

/// Resource-owner password grant (public client).
async fn password_grant(
    client: &reqwest::Client,
    identity: &AppIdentity,
    credential: &PublicCredential,
) -> Result<AccessToken> {
    let response = client
        .post(identity.token_endpoint())
        .form(&[
            ("grant_type", "password"),
            ("client_id", identity.client_id.as_str()),
            ("scope", identity.scope.as_str()),
            ("username", credential.username.as_str()),
            ("password", credential.password.expose().as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("password grant request failed: {e}")))?;

    read_token(response, identity, "password grant").await
}

/// Client-credentials grant (confidential client).
async fn client_credentials_grant(
    client: &reqwest::Client,
    identity: &AppIdentity,
    credential: &ConfidentialCredential,
) -> Result<AccessToken> {
    let response = client
        .post(identity.token_endpoint())
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", identity.client_id.as_str()),
            ("client_secret", credential.client_secret.expose().as_str()),
            ("scope", identity.scope.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("client credentials request failed: {e}")))?;

    read_token(response, identity, "client credentials grant").await
}

/// Classify the token response: non-success status carries the AAD error
/// body (e.g. AADSTS codes) into the returned error.
async fn read_token(
    response: reqwest::Response,
    identity: &AppIdentity,
    grant: &str,
) -> Result<AccessToken> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Auth(format!("{grant} returned {status}: {body}")));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("invalid token response: {e}")))?;

    Ok(AccessToken {
        value: token.access_token,
        scope: identity.scope.clone(),
    })
}
