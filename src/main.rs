use bitcoin_pulse::application::system::Application;
use bitcoin_pulse::config::Config;

use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Initializing Bitcoin Pulse...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return Err(e);
        }
    };

    let app = Application::build(config).await?;
    app.start().await?;

    info!("Bitcoin Pulse stopped.");
    Ok(())
}
