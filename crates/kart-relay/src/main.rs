//! Kart timing relay - Entry Point
//!
//! Keeps one connection to the vendor timing feed and serves the latest
//! session state at `/session.json` next to the static dashboard.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Kart timing relay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via KART_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    kart_telemetry::init_logging()?;

    info!("Starting kart relay v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > KART_CONFIG env var > config/default.toml
    let config_path = args.config.or_else(|| std::env::var("KART_CONFIG").ok());
    info!(config_path = ?config_path, "Loading configuration");

    let config = kart_relay::AppConfig::load(config_path.as_deref())?;
    info!(
        port = config.dashboard.port,
        vendor_url = %config.feed.vendor_url,
        "Configuration loaded"
    );

    let app = kart_relay::Application::new(config)?;
    app.run().await?;

    Ok(())
}
