//! Multicast enqueue node - Main Entry Point
//!
//! Reads JSON messages from stdin, one per line, enqueues each as a
//! multicast downlink and writes the resulting messages to stdout.
//!
//! Usage: `chirpstack-multicast [CONFIG.toml]`

use anyhow::Context;
use chirpstack_multicast::{
    config::{default_config_path, AppConfig, LoggingConfig},
    NodeHost, NodeMessage,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,chirpstack_multicast=debug";

fn main() -> anyhow::Result<()> {
    let config_path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => default_config_path().context("Could not determine config directory")?,
    };
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let _log_guard = init_logging(&config.logging);
    tracing::info!("Starting multicast node with {:?}", config_path);

    let host = NodeHost::spawn(config, tokio::io::BufReader::new(tokio::io::stdin()));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = host.run_until_closed(|msg| match msg {
        NodeMessage::Status(status) => {
            tracing::info!("[{:?} {:?}] {}", status.fill, status.shape, status.text);
        }
        NodeMessage::Output(msg) => match msg.to_json() {
            Ok(line) => {
                if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                    tracing::error!("Failed to write output: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize output: {}", e),
        },
        NodeMessage::Closed => tracing::info!("Node closed"),
    });

    tracing::info!("Shutting down...");
    result.context("Multicast node stopped with an error")
}

fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(logging.filter.as_deref().unwrap_or(DEFAULT_FILTER))
        })
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    match &logging.directory {
        Some(dir) => {
            let prefix = logging
                .file_prefix
                .as_deref()
                .unwrap_or("chirpstack-multicast.log");
            let appender = tracing_appender::rolling::daily(dir, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(filter()),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(stderr_layer).init();
            None
        }
    }
}
