//! Persisted resource state
//!
//! The provisioner stands in for the declarative framework, so it keeps the
//! created PAT's state (including the write-once token value) in a JSON
//! file. Writes are atomic (temp file + rename) and the file is 0600 since
//! it contains the issued PAT.

use std::path::Path;

use pat_resource::PatState;
use tracing::{debug, info};

/// Load the persisted state, if any. A missing file means nothing has been
/// provisioned yet.
pub async fn load(path: &Path) -> common::Result<Option<PatState>> {
    if !path.exists() {
        debug!(path = %path.display(), "no state file");
        return Ok(None);
    }
    let contents = tokio::fs::read_to_string(path).await?;
    let state: PatState = serde_json::from_str(&contents)
        .map_err(|e| common::Error::State(format!("parsing state file: {e}")))?;
    info!(path = %path.display(), id = ?state.id, "loaded state");
    Ok(Some(state))
}

/// Persist the state atomically with owner-only permissions.
pub async fn save(path: &Path, state: &PatState) -> common::Result<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| common::Error::State(format!("serializing state: {e}")))?;

    // Temp file in the same directory so the rename stays on one filesystem
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tmp_path = dir.join(format!(".pat-state.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes()).await?;

    // 0600: the state file holds the issued PAT (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms).await?;
    }

    tokio::fs::rename(&tmp_path, path).await?;
    debug!(path = %path.display(), "persisted state");
    Ok(())
}

/// Remove the state file after a successful destroy.
pub async fn remove(path: &Path) -> common::Result<()> {
    if path.exists() {
        tokio::fs::remove_file(path).await?;
        info!(path = %path.display(), "removed state file");
    }
    Ok(())
}
