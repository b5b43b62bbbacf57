//! DingTalk notifier
//!
//! Sends alert messages to a DingTalk robot, either one-off from the command
//! line or continuously from stdin with the configuration file hot-reloaded.

use anyhow::Result;
use clap::Parser;
use dingtalk_notifier::{
    app,
    cli::{Cli, Command},
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    diagnostics::TracingDiagnostic,
    notification::DingtalkService,
    watcher::ConfigWatcher,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli).unwrap_or_else(|err| {
        // Logging is not configured yet; fall back to the default subscriber.
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {:#}", err);
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("DingTalk notifier starting up...");
    info!("Log Level: {}", config.log_level);
    info!(
        "DingTalk: {}",
        if config.dingtalk.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    match config.http.timeout_seconds {
        Some(secs) => info!("HTTP Timeout: {}s", secs),
        None => info!("HTTP Timeout: None"),
    }

    let mut client = reqwest::Client::builder();
    if let Some(secs) = config.http.timeout_seconds {
        client = client.timeout(Duration::from_secs(secs));
    }
    let service = Arc::new(DingtalkService::with_client(
        config.dingtalk.clone(),
        Arc::new(TracingDiagnostic::new()),
        client.build()?,
    ));

    match cli.command.clone().unwrap_or(Command::Run) {
        Command::Send { message } => app::send_message(&service, &message).await?,
        Command::Test => app::run_self_test(&service).await?,
        Command::Run => run(&cli, service).await?,
    }

    Ok(())
}

/// Dispatches stdin lines until end of input or Ctrl-C, with the config file
/// hot-reloaded when it exists.
async fn run(cli: &Cli, service: Arc<DingtalkService>) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let _watcher = if config_path.exists() {
        Some(ConfigWatcher::spawn(&config_path, service.clone(), None)?)
    } else {
        warn!(
            "Config file {:?} not found, hot reload disabled",
            config_path
        );
        None
    };

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down.");
        }
        summary = app::dispatch_lines(&service, stdin) => {
            let summary = summary?;
            info!("Processed {} alerts ({} dropped).", summary.received, summary.dropped);
        }
    }

    Ok(())
}
