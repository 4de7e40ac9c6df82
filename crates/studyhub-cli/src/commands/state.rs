//! The `studyhub state` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use studyhub_client::ApiClient;
use studyhub_core::config::load_config_from;

pub async fn execute(
    client_id: String,
    server: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let server = server.unwrap_or(config.server_url);

    let api = ApiClient::new(&server);
    let state = api
        .get_state(&client_id)
        .await
        .with_context(|| format!("failed to fetch state from {server}"))?;

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
