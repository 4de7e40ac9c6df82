//! Configuration loading.
//!
//! A single TOML file configures both the server binary and the sync
//! client defaults. Search order: `studyhub.toml` in the current
//! directory, then `~/.config/studyhub/config.toml`, then built-in
//! defaults. `STUDYHUB_ADDR` and `STUDYHUB_DATA_DIR` override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level studyhub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyhubConfig {
    /// Address the API server binds to.
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Directory for persisted client-state documents. `None` keeps
    /// state in memory only.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Optional catalog JSON file; the built-in catalog is used when
    /// absent.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Base URL the sync client talks to.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Per-request HTTP timeout for the sync client.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Quiet period before a notes edit is written through.
    #[serde(default = "default_debounce")]
    pub notes_debounce_ms: u64,
}

fn default_addr() -> String {
    "127.0.0.1:8780".to_string()
}
fn default_server_url() -> String {
    "http://127.0.0.1:8780".to_string()
}
fn default_request_timeout() -> u64 {
    15
}
fn default_debounce() -> u64 {
    600
}

impl Default for StudyhubConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            data_dir: None,
            catalog: None,
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout(),
            notes_debounce_ms: default_debounce(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path_env_vars(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from the well-known paths.
pub fn load_config() -> Result<StudyhubConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyhubConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studyhub.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudyhubConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyhubConfig::default(),
    };

    if let Ok(addr) = std::env::var("STUDYHUB_ADDR") {
        config.addr = addr;
    }
    if let Ok(dir) = std::env::var("STUDYHUB_DATA_DIR") {
        config.data_dir = Some(PathBuf::from(dir));
    }

    config.addr = resolve_env_vars(&config.addr);
    config.server_url = resolve_env_vars(&config.server_url);
    config.data_dir = config.data_dir.map(|p| resolve_path_env_vars(&p));
    config.catalog = config.catalog.map(|p| resolve_path_env_vars(&p));

    Ok(config)
}

/// `~/.config/studyhub`, also where the client identity token lives.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyhub"))
}
