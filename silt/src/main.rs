//! The Silt server binary.

use std::path::Path;

use anyhow::Context;
use silt::SiltServer;
use silt_core::config::ServerConfig;
use tokio::{select, signal};

const CONFIG_PATH: &str = "config/silt_config.json5";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load_or_create(Path::new(CONFIG_PATH))
        .with_context(|| format!("failed to load {CONFIG_PATH}"))?;
    silt::logger::init(&config.log).context("failed to set up logging")?;

    let server = SiltServer::new(&config);
    server.start();
    log::info!("Started Silt, press Ctrl-C to stop");

    let cancel_token = server.cancel_token.clone();
    select! {
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            log::info!("Stopping Silt");
        }
        () = cancel_token.cancelled() => {}
    }

    server.stop();
    log::info!("Stopped Silt");
    Ok(())
}
