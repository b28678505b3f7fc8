use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ta_scout::config::{Config, LoggingConfig};
use ta_scout::scanner::OpportunityScanner;
use ta_scout::snapshot::SnapshotBuilder;

#[derive(Parser)]
#[command(
    name = "ta-scout",
    version,
    about = "Technical snapshots and opportunity scans for Binance spot pairs",
    propagate_version = true
)]
struct Cli {
    /// Path to the TOML config (defaults to config/default.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a technical snapshot for one symbol and print it as JSON
    Analyze {
        /// Symbol such as BTC, eth-usdt or SOLUSDT
        symbol: String,
    },
    /// Rank the USDT universe and print the top opportunities as JSON
    Scan,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON result, so logs go to stderr.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);

    tracing::info!(
        mirror_url = %config.exchange.mirror_base_url,
        rest_url = %config.exchange.rest_base_url,
        timeout_ms = config.exchange.request_timeout_ms,
        "Starting ta-scout"
    );

    let output = match cli.command {
        Commands::Analyze { symbol } => {
            let builder = SnapshotBuilder::from_config(&config)?;
            let snapshot = builder.build(&symbol).await;
            if snapshot.is_simulation {
                tracing::warn!(
                    symbol = %snapshot.symbol,
                    "Live data unavailable; output is simulated"
                );
            }
            serde_json::to_string_pretty(&snapshot).context("failed to serialize snapshot")?
        }
        Commands::Scan => {
            let scanner = OpportunityScanner::from_config(&config)?;
            let coins = scanner.scan().await;
            serde_json::to_string_pretty(&coins).context("failed to serialize scan")?
        }
    };

    println!("{}", output);
    Ok(())
}
