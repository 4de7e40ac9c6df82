pub mod branches;
pub mod init;
pub mod quiz;
pub mod serve;
pub mod state;

use std::path::Path;

use anyhow::{Context, Result};

use studyhub_core::catalog::Catalog;

/// Load the catalog from a user-supplied file, or fall back to the
/// built-in one.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => Catalog::from_path(p)
            .with_context(|| format!("failed to load catalog from {}", p.display())),
        None => Ok(Catalog::builtin()),
    }
}
