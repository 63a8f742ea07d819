//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Create every directory the server writes into; warn on a missing public dir.
pub async fn ensure_env(public_dir: &Path, writable_dirs: &[&Path]) -> anyhow::Result<()> {
    if tokio::fs::metadata(public_dir).await.is_err() {
        warn!(public_dir = %public_dir.display(), "public directory not found; creating it");
    }
    for dir in writable_dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
        info!(dir = %dir.display(), "directory ready");
    }
    Ok(())
}
