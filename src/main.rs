#![forbid(unsafe_code)]

//! `playerdb-relay`: player database relay binary.
//!
//! Loads configuration, starts the dispatch service, and bridges it to the
//! game server over stdio. Logs go to stderr; stdout carries the bridge
//! protocol.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use playerdb_relay::bridge::{reader, writer};
use playerdb_relay::config::GlobalConfig;
use playerdb_relay::service::{DispatchService, ServiceSettings, QUEUE_CAPACITY};
use playerdb_relay::{AppError, Result};

const STDIN_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "playerdb-relay", about = "Player database relay for game servers", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!(version = env!("CARGO_PKG_VERSION"), "playerdb-relay bootstrap");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?;
    let result = runtime.block_on(run(args));

    // A blocking stdin read cannot be interrupted; do not wait on it forever.
    runtime.shutdown_timeout(STDIN_SHUTDOWN_GRACE);
    result
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = load_config(&args.config).await;
    if let Some(url) = config.endpoint() {
        tracing::debug!(url, "api endpoint");
    }

    // ── Start dispatch service ──────────────────────────
    let ct = CancellationToken::new();
    let (outbound_tx, outbound_rx) = mpsc::channel(QUEUE_CAPACITY);
    let (service, dispatch_runtime) =
        DispatchService::start(ServiceSettings::from_config(&config), outbound_tx, ct.clone())?;

    // ── Start bridge ────────────────────────────────────
    let writer_ct = ct.clone();
    let writer_handle = tokio::spawn(async move {
        if let Err(err) = writer::run_writer(tokio::io::stdout(), outbound_rx, writer_ct).await {
            error!(%err, "bridge writer failed");
        }
    });

    let reader_ct = ct.clone();
    let inbox = service.inbox();
    let mut reader_handle =
        tokio::spawn(async move { reader::run_reader(tokio::io::stdin(), inbox, reader_ct).await });

    info!("relay ready");

    // ── Wait for shutdown signal or host disconnect ─────
    tokio::select! {
        () = shutdown_signal() => info!("shutdown signal received"),
        exit = &mut reader_handle => info!(?exit, "host bridge closed"),
    }
    ct.cancel();

    // ── Wait for background tasks ───────────────────────
    drop(service);
    match dispatch_runtime.task.await {
        Ok(stats) => info!(?stats, "dispatch statistics"),
        Err(err) => error!(%err, "dispatch service task failed"),
    }
    if let Err(err) = writer_handle.await {
        error!(%err, "bridge writer task failed");
    }
    reader_handle.abort();
    info!("playerdb-relay shut down");

    Ok(())
}

/// Load the configuration file, falling back to a disabled relay on error.
///
/// A missing API key keeps joins flowing (with an empty key) but leaves the
/// lookup command unregistered.
async fn load_config(path: &std::path::Path) -> GlobalConfig {
    let mut config = match GlobalConfig::load_from_path(path) {
        Ok(config) => {
            info!("configuration loaded");
            config
        }
        Err(err) => {
            error!(%err, "configuration unusable; relay disabled");
            return GlobalConfig::default();
        }
    };

    if let Err(err) = config.load_credentials().await {
        warn!(%err, "no api key available; lookup command disabled");
        config.disable_lookup();
    }

    config
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
