//! # Designer Chat CLI (`designer-chat`)
//!
//! ## Usage
//!
//! ```bash
//! designer-chat --config ./config/designer-chat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `designer-chat init` | Create the database and form collection |
//! | `designer-chat get <formId>` | Print a stored form with nulls pruned |
//! | `designer-chat serve` | Start the HTTP server |
//!
//! Log verbosity is controlled with `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use designer_chat::{config, get, provision, server};

/// Designer Chat — edit form configurations by chatting with a language model.
#[derive(Parser)]
#[command(
    name = "designer-chat",
    about = "Designer Chat — edit form configurations by chatting with a language model",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/designer-chat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and form collection.
    ///
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Print a stored form configuration as the model would see it.
    Get {
        /// Form identifier (also the partition key).
        form_id: String,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `/health` and `/humphrey/chat`.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            provision::run_provision(&cfg).await?;
            println!("Form store initialized successfully.");
        }
        Commands::Get { form_id } => {
            get::run_get(&cfg, &form_id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
