// EmPOWER eNB agent: connects a configured eNB to its controller.

mod config;
mod logging;
mod net;
mod registry;
mod static_enb;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::registry::Registry;
use crate::static_enb::StaticEnb;

#[derive(Debug, Parser)]
#[command(name = "empower-agent", version, about = "EmPOWER eNB agent")]
struct Cli {
    /// Config file (TOML, or the legacy "<addr> <port>" line).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the configured eNB id.
    #[arg(long, value_name = "ID")]
    enb_id: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(id) = cli.enb_id {
        cfg.enb_id = id;
    }
    logging::init(&cfg.log_level);
    info!(
        enb_id = cfg.enb_id,
        ctrl = %format!("{}:{}", cfg.ctrl_addr, cfg.ctrl_port),
        cells = cfg.cells.len(),
        ues = cfg.ues.len(),
        "starting agent"
    );

    let registry = Registry::new();
    let enb = StaticEnb::new(cfg.cells.clone(), cfg.ues.clone());
    registry
        .start(cfg.enb_id, Box::new(enb), cfg.agent_settings(), cfg.link())
        .await
        .with_context(|| format!("failed to start agent for eNB {}", cfg.enb_id))?;

    shutdown_signal().await?;
    info!("shutting down");
    registry.stop_all().await;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM (Unix).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("failed to wait for Ctrl+C")?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.context("failed to wait for Ctrl+C")?;
    }
    Ok(())
}
