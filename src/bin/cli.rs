//! minikv CLI
//!
//! Opens a data directory, runs a single operation and exits.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use minikv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// minikv CLI
#[derive(Parser, Debug)]
#[command(name = "minikv")]
#[command(about = "CLI for the minikv embedded key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./minikv_data")]
    data_dir: PathBuf,

    /// fsync after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Compact the log, dropping stale and deleted records
    Merge,

    /// Print live key count and log size
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,minikv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_on_write(args.sync)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> minikv::Result<()> {
    match command {
        Commands::Get { key } => match engine.get(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            engine.set(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            engine.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Merge => {
            let before = engine.log_size();
            engine.merge()?;
            println!("merged: {} -> {} bytes", before, engine.log_size());
        }
        Commands::Stats => {
            println!("keys: {}", engine.key_count());
            println!("log_bytes: {}", engine.log_size());
            println!("log_path: {}", engine.log_path().display());
        }
    }
    Ok(())
}
