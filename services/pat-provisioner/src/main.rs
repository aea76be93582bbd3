//! Azure DevOps PAT provisioner
//!
//! Thin lifecycle driver around the `pat-resource` orchestrator:
//! 1. `apply`    — create the configured PAT and persist its state
//! 2. `destroy`  — revoke the PAT recorded in the state file
//! 3. `import`   — record an existing PAT's authorization id as state
//!
//! Rotation is external: changing the PAT's name or scopes means
//! `destroy` followed by `apply`; there is no in-place update.

mod config;
mod state;

use anyhow::{Context, Result, bail};
use azure_auth::AzCli;
use pat_resource::{PatResource, PatState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        pat_name = %config.pat.name,
        endpoint = %config.pat.endpoint,
        is_public = config.app.is_public,
        toggle = config.workaround.switch_private_public,
        "configuration loaded"
    );

    let resource = PatResource::new(reqwest::Client::new(), AzCli::new());

    match command {
        Some("apply") => apply(&config, &resource).await,
        Some("destroy") => destroy(&config, &resource).await,
        Some("import") => {
            let id = args
                .get(2)
                .filter(|a| a.as_str() != "--config")
                .context("usage: pat-provisioner import <authorization-id> [--config <path>]")?;
            import(&config, &resource, id).await
        }
        _ => {
            bail!("usage: pat-provisioner <apply|destroy|import <id>> [--config <path>]")
        }
    }
}

async fn apply(config: &Config, resource: &PatResource<AzCli>) -> Result<()> {
    if let Some(existing) = state::load(&config.pat.state_file).await? {
        if existing.id.is_some() {
            // The PAT is immutable after creation; replacement goes through destroy
            info!(id = ?existing.id, "PAT already provisioned, nothing to do");
            return Ok(());
        }
    }

    let spec = config.to_spec();
    let record = resource
        .create(&spec)
        .await
        .context("could not create PAT")?;
    info!(id = %record.id, name = %record.name, valid_to = %record.valid_to, "PAT created");

    state::save(&config.pat.state_file, &PatState::from_record(record))
        .await
        .context("PAT was created but its state could not be persisted")?;
    Ok(())
}

async fn destroy(config: &Config, resource: &PatResource<AzCli>) -> Result<()> {
    let Some(prior) = state::load(&config.pat.state_file).await? else {
        warn!("no state file, nothing to destroy");
        return Ok(());
    };

    let spec = config.to_spec();
    resource
        .delete(&spec, &prior)
        .await
        .context("could not delete PAT")?;
    info!(id = ?prior.id, "PAT destroyed");

    state::remove(&config.pat.state_file).await?;
    Ok(())
}

async fn import(config: &Config, resource: &PatResource<AzCli>, id: &str) -> Result<()> {
    let stub = resource.import_by_id(id);
    state::save(&config.pat.state_file, &stub)
        .await
        .context("could not persist imported state")?;
    info!(id, "imported PAT by authorization id (placeholder state, no read-back exists)");
    Ok(())
}
