use anyhow::Result;
use colored::Colorize;
use packfy_gateway::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration and runs the server in the foreground until a
/// shutdown signal arrives.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting Packfy gateway...".green());

    let cfg = config::load_config(config_path)?;

    info!("Configuration loaded from {}", config_path.display());

    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
