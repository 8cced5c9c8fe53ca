//! XRPL market maker - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// XRPL single-pair market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via XRPMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    let args = Args::parse();

    xrpmm_telemetry::init_logging()?;

    info!("Starting xrpmm-bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > XRPMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("XRPMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = xrpmm_bot::AppConfig::from_file(&config_path)?;
    info!(
        url = %config.ledger.url,
        currency = %config.pair.currency,
        issuer = %config.pair.issuer,
        "Configuration loaded"
    );

    let app = xrpmm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
