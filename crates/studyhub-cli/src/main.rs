//! studyhub CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyhub", version, about = "Psychology study hub server and client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Listen address (host:port)
        #[arg(long)]
        addr: Option<String>,

        /// Directory for persisted client state (in-memory if omitted)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Catalog JSON file (built-in catalog if omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the branches of the content catalog
    Branches {
        /// Catalog JSON file (built-in catalog if omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Fetch a client's state from a running server
    State {
        /// Client identity token
        #[arg(long)]
        client_id: String,

        /// Server base URL
        #[arg(long)]
        server: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Play a branch quiz on the terminal
    Quiz {
        /// Branch slug (e.g. "cognitive")
        slug: String,

        /// Server base URL; when given, the best score is synced
        #[arg(long)]
        server: Option<String>,

        /// Client identity token (default: the stored local identity)
        #[arg(long)]
        client_id: Option<String>,

        /// Catalog JSON file (built-in catalog if omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studyhub=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            addr,
            data_dir,
            catalog,
            config,
        } => commands::serve::execute(addr, data_dir, catalog, config).await,
        Commands::Branches { catalog } => commands::branches::execute(catalog),
        Commands::State {
            client_id,
            server,
            config,
        } => commands::state::execute(client_id, server, config).await,
        Commands::Quiz {
            slug,
            server,
            client_id,
            catalog,
        } => commands::quiz::execute(slug, server, client_id, catalog).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
