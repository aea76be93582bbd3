//! The lifecycle operations exposed to the calling framework

use azure_auth::{AppRegistrationCli, acquire_token};
use devops_pat::{PatRecord, create_pat, delete_pat};
use tracing::info;

use crate::error::Result;
use crate::spec::{PatSpec, PatState};

/// Orchestrates acquirer and PAT client for one managed resource.
///
/// Holds the shared HTTP client and the app-registration CLI bridge; both
/// are reused across operations, but tokens never are.
pub struct PatResource<C: AppRegistrationCli> {
    client: reqwest::Client,
    cli: C,
}

impl<C: AppRegistrationCli> PatResource<C> {
    pub fn new(client: reqwest::Client, cli: C) -> Self {
        Self { client, cli }
    }

    /// Create the PAT described by `spec`.
    ///
    /// Flow selection fails fast on missing credentials before any network
    /// call. A failed create produces no record — there is no partial state.
    pub async fn create(&self, spec: &PatSpec) -> Result<PatRecord> {
        let flow = spec.flow()?;
        let token = acquire_token(&self.client, &self.cli, &spec.identity(), &flow).await?;
        let record = create_pat(
            &self.client,
            &spec.pat_endpoint,
            &token.value,
            &spec.pat_name,
            &spec.pat_scopes,
        )
        .await?;
        Ok(record)
    }

    /// Delete the PAT recorded in `prior`.
    ///
    /// With no known id this is a no-op: nothing was created or it is
    /// already gone. On failure the prior state is left untouched so the
    /// deletion can be retried.
    pub async fn delete(&self, spec: &PatSpec, prior: &PatState) -> Result<()> {
        let id = match prior.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                info!(name = %prior.name, "no PAT id in prior state, nothing to delete");
                return Ok(());
            }
        };

        let flow = spec.flow()?;
        let token = acquire_token(&self.client, &self.cli, &spec.identity(), &flow).await?;
        delete_pat(&self.client, &spec.pat_endpoint, &token.value, id).await?;
        Ok(())
    }

    /// Pass-through update: the PAT itself is immutable after creation, so
    /// updates change nothing here. Fields that require a real change
    /// (name, scopes) are replace-triggering upstream.
    pub fn update(&self, prior: PatState) -> PatState {
        prior
    }

    /// Import an existing PAT by its authorization id. Produces a stub
    /// record only — the API cannot read a PAT back, so the remaining
    /// fields stay unset.
    pub fn import_by_id(&self, id: &str) -> PatState {
        PatState::imported(id)
    }
}
