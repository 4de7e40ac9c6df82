//! Stable per-installation client identity.
//!
//! The identifier is an opaque, client-generated token stored in a
//! well-known file; the server never issues one. If durable storage is
//! unavailable the token degrades silently to an in-memory value for
//! the lifetime of the process; state then simply will not persist
//! across runs.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use studyhub_core::config::config_dir;

/// File name of the identity token under the studyhub config dir.
const CLIENT_ID_FILE: &str = "client-id";

/// Return the stable client identifier, creating and persisting one on
/// first use.
pub fn resolve_client_id() -> String {
    match config_dir() {
        Some(dir) => resolve_client_id_at(&dir.join(CLIENT_ID_FILE)),
        None => {
            warn!("no home directory; using an in-memory client id");
            Uuid::new_v4().to_string()
        }
    }
}

/// Same as [`resolve_client_id`], against an explicit token file.
pub fn resolve_client_id_at(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let token = existing.trim();
        if !token.is_empty() {
            return token.to_string();
        }
    }

    let id = Uuid::new_v4().to_string();
    if let Err(e) = write_token(path, &id) {
        warn!(
            path = %path.display(),
            error = %e,
            "could not persist client id; state will not survive restarts"
        );
    }
    id
}

fn write_token(path: &Path, id: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, id)
}

/// Default token file location, for display in diagnostics.
pub fn default_token_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CLIENT_ID_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_creates_and_later_calls_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client-id");

        let first = resolve_client_id_at(&path);
        assert!(!first.is_empty());
        assert!(path.exists());

        let second = resolve_client_id_at(&path);
        assert_eq!(first, second);
    }

    #[test]
    fn whitespace_only_token_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client-id");
        std::fs::write(&path, "  \n").unwrap();

        let id = resolve_client_id_at(&path);
        assert!(!id.trim().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), id);
    }

    #[test]
    fn unwritable_storage_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be makes
        // every write fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("client-id");

        let first = resolve_client_id_at(&path);
        assert!(!first.is_empty());

        // Degraded mode: a new in-memory token each call.
        let second = resolve_client_id_at(&path);
        assert_ne!(first, second);
    }
}
