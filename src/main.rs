//! Pool Actions CLI
//!
//! Converts an Etherscan token-transfer export for one pool into a JSON
//! document of classified pool actions.
//!
//! Usage:
//!   cargo run --bin pool-actions -- -i transfers.csv -o actions.json -p 0xPOOL
//!   POOL_ADDRESS=0xPOOL cargo run --bin pool-actions -- -i transfers.csv -o actions.json
//!   cargo run --bin pool-actions -- --config converter.toml

use anyhow::Result;
use clap::Parser;
use pool_actions::config::{ConfigOverrides, ConverterConfig, ConverterSection, FileConfig};
use pool_actions::convert_file;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Classify pool token transfers into swap/join/exit actions
#[derive(Parser)]
#[command(name = "pool-actions")]
struct Args {
    /// Transfer export (CSV)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output document (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pool contract address
    #[arg(short, long, env = "POOL_ADDRESS")]
    pool_address: Option<String>,

    /// TOML config file with a [converter] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write single-line JSON instead of indented
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    // POOL_ADDRESS and RUST_LOG may come from .env
    dotenv::dotenv().ok();

    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            FileConfig::load(path)?.converter
        }
        None => ConverterSection::default(),
    };

    let overrides = ConfigOverrides {
        input: args.input,
        output: args.output,
        pool_address: args.pool_address,
        compact: args.compact,
    };

    let config = match ConverterConfig::resolve(file, overrides) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let summary = convert_file(&config)?;
    println!("{}", summary.report());

    Ok(())
}
