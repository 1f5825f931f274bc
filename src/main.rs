//! # Standards Hub CLI (`standards`)
//!
//! ## Usage
//!
//! ```bash
//! standards --config ./config/standards.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `standards sources` | List configured sources and their status |
//! | `standards list` | List all standards (optionally one category) |
//! | `standards categories` | List the categories present |
//! | `standards get <id>` | Print one standard |
//! | `standards search "<query>"` | Keyword relevance search |
//!
//! Set `RUST_LOG=debug` for cache and collision diagnostics on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use standards_hub::commands;
use standards_hub::config;
use standards_hub::manager::StandardsManager;
use standards_hub::sources;

/// Standards Hub: aggregate and search documentation standards from local,
/// remote, and git sources.
#[derive(Parser)]
#[command(name = "standards", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/standards.toml")]
    config: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured sources and their status.
    ///
    /// Does not contact remote or git sources.
    Sources,

    /// List standards.
    List {
        /// Only standards in this category (exact match).
        #[arg(long)]
        category: Option<String>,
    },

    /// List categories in first-seen order.
    Categories,

    /// Print a standard by id.
    ///
    /// Exits with status 1 and prints suggestions if the id is unknown.
    Get {
        /// Standard id, e.g. `frontend-vue-components`.
        id: String,
    },

    /// Search standards by keyword relevance.
    Search {
        /// The search query string.
        query: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg);
        }
        Commands::List { category } => {
            let manager = load_manager(&cfg).await?;
            commands::run_list(&manager, category.as_deref(), cli.json)?;
        }
        Commands::Categories => {
            let manager = load_manager(&cfg).await?;
            commands::run_categories(&manager, cli.json)?;
        }
        Commands::Get { id } => {
            let manager = load_manager(&cfg).await?;
            if !commands::run_get(&manager, &id, cli.json)? {
                std::process::exit(1);
            }
        }
        Commands::Search { query } => {
            let manager = load_manager(&cfg).await?;
            commands::run_search(&manager, &query, cli.json)?;
        }
    }

    Ok(())
}

async fn load_manager(cfg: &config::Config) -> anyhow::Result<StandardsManager> {
    let manager = StandardsManager::from_config(cfg)?;
    manager.initialize().await;
    Ok(manager)
}
