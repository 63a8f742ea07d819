//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can prepare the
//! storage directories without depending directly on `common`.

use std::path::Path;

/// Ensure the contacts, avatars and tmp directories exist.
pub async fn ensure_env(public_dir: &Path, contacts_path: &Path, avatars_dir: &Path, tmp_dir: &Path) -> anyhow::Result<()> {
    let contacts_dir = contacts_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    common::env::ensure_env(public_dir, &[contacts_dir, avatars_dir, tmp_dir]).await
}
