//! The `studyhub serve` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use studyhub_core::config::load_config_from;
use studyhub_server::StateStore;

pub async fn execute(
    addr: Option<String>,
    data_dir: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    // CLI flags win over config file and environment.
    let addr = addr.unwrap_or(config.addr);
    let data_dir = data_dir.or(config.data_dir);
    let catalog_path = catalog_path.or(config.catalog);

    let catalog = Arc::new(super::load_catalog(catalog_path.as_deref())?);
    info!(branches = catalog.len(), "catalog loaded");

    let store = match data_dir {
        Some(dir) => {
            info!(data_dir = %dir.display(), "persisting client state");
            StateStore::with_data_dir(catalog, dir)
        }
        None => {
            info!("running with in-memory state only");
            StateStore::in_memory(catalog)
        }
    };

    studyhub_server::serve(&addr, Arc::new(store)).await
}
