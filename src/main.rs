//! # Farm Advisor CLI (`farm-advisor`)
//!
//! Runs the HTTP service and offers a few local commands against the same
//! database.
//!
//! ## Usage
//!
//! ```bash
//! farm-advisor --config ./config/farm-advisor.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `farm-advisor init` | Create the SQLite database and tables |
//! | `farm-advisor serve` | Start the HTTP API server |
//! | `farm-advisor farms` | Print all stored farm records |
//! | `farm-advisor markets` | Print all stored market records |
//! | `farm-advisor advise <id>` | Compose one advisory and print it |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use farm_advisor::{advisor, config, list, migrate, server};

/// Farm Advisor: farm and market records with a model-backed advisory.
#[derive(Parser)]
#[command(
    name = "farm-advisor",
    about = "Farm and market records service with a per-farm advisory",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/farm-advisor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file and the `farmer_data` and `market_data`
    /// tables. Running it again is harmless.
    Init,

    /// Start the HTTP API server on `[server].bind`.
    Serve,

    /// Print all farm records as JSON.
    Farms,

    /// Print all market records as JSON.
    Markets,

    /// Compose the advisory for one farm and print it as JSON.
    ///
    /// Calls the configured chat model and image provider.
    Advise {
        /// Farm identifier (`Farm_ID`).
        farm_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `farms`/`markets`/`advise` output stays clean JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            tracing::info!("Starting farm-advisor v{}", env!("CARGO_PKG_VERSION"));
            server::run_server(&cfg).await?;
        }
        Commands::Farms => {
            list::run_farms(&cfg).await?;
        }
        Commands::Markets => {
            list::run_markets(&cfg).await?;
        }
        Commands::Advise { farm_id } => {
            advisor::run_advise(&cfg, farm_id).await?;
        }
    }

    Ok(())
}
