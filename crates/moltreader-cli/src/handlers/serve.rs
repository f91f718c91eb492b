//! Serve command handler.

use anyhow::Result;
use moltreader_axum::{ServerConfig, start_server};

use crate::bootstrap::CliContext;

/// Start the web reader and run until the process is terminated.
pub async fn execute(ctx: &CliContext, port: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::from_settings(&ctx.settings);
    if let Some(port) = port {
        config = config.with_port(port);
    }

    println!("Starting moltreader web server on http://localhost:{}", config.port);
    start_server(config, &ctx.settings).await
}
