use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use restart_common::RunMode;
use restart_orchestrator::{Orchestrator, RunPhase};
use restart_portainer::PortainerClient;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::Cli;
use config::AppConfig;

const DEFAULT_LOG_FILTER: &str =
    "info,factom_restart=debug,restart_orchestrator=debug,restart_portainer=debug";

fn init_tracing(ansi: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(!cli.no_color);

    let config_path = cli.config_path()?;
    info!("Using config: {}", config_path.display());

    let mut config = AppConfig::load(&config_path)?;
    config.apply_overrides(cli.overrides());
    config.validate()?;

    info!("Starting restart system");
    info!("Portainer endpoint: {}", config.endpoint);

    let mode = RunMode::from_live_flag(cli.live);
    if mode.is_live() {
        warn!("LIVE mode: network will be restarted!");
    } else {
        info!("DRY RUN mode: simulating restart");
    }

    debug!(phase = %RunPhase::Idle, "Run phase");
    let client = PortainerClient::login(config.client_config(), &config.credentials())
        .await
        .wrap_err("Portainer login failed")?;
    debug!(phase = %RunPhase::Authenticated, "Run phase");

    let orchestrator = Orchestrator::new(Arc::new(client), mode).with_label(config.label.clone());
    let report = orchestrator
        .run()
        .await
        .wrap_err("Restart run aborted")?;

    report.log_summary();
    Ok(())
}
