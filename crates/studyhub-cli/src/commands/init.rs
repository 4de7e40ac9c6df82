//! The `studyhub init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("studyhub.toml").exists() {
        println!("studyhub.toml already exists, skipping.");
    } else {
        std::fs::write("studyhub.toml", SAMPLE_CONFIG)?;
        println!("Created studyhub.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit studyhub.toml (listen address, data directory)");
    println!("  2. Run: studyhub serve");
    println!("  3. Run: studyhub quiz cognitive --server http://127.0.0.1:8780");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyhub configuration

# Server listen address.
addr = "127.0.0.1:8780"

# Directory for persisted client state. Comment out for in-memory only.
data_dir = "${HOME}/.local/share/studyhub"

# Custom catalog JSON file. Comment out for the built-in catalog.
# catalog = "branches.json"

# Base URL client commands talk to.
server_url = "http://127.0.0.1:8780"

# HTTP request timeout in seconds.
request_timeout_secs = 15

# Quiet period before notes are autosaved, in milliseconds.
notes_debounce_ms = 600
"#;
