//! TulipBroker terminal - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

/// TulipBroker trading terminal
#[derive(Parser, Debug)]
#[command(name = "tulip", version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TULIP_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: tulip_cli::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > TULIP_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TULIP_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = tulip_cli::AppConfig::load(&config_path)?;

    tulip_telemetry::init_logging(&config.log_level)?;
    info!(config_path = %config_path, api_url = ?config.api_url(), "Configuration loaded");
    debug!(command = ?args.command, "Running command");

    let app = tulip_cli::Application::new(config)?;
    let mut stdout = std::io::stdout().lock();
    app.run(args.command, &mut stdout).await?;

    Ok(())
}
