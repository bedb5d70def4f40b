#![forbid(unsafe_code)]

//! `simdeck`: simulator session server binary.
//!
//! Loads configuration, then serves the session control API until a
//! shutdown signal arrives, terminating any running engine on the way out.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use simdeck::api::routes::serve_http;
use simdeck::api::SessionController;
use simdeck::config::GlobalConfig;
use simdeck::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "simdeck", about = "Simulator session server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the engine executable.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Override the HTTP port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the directory holding the source and memory files.
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("simdeck server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };

    if let Some(engine) = args.engine {
        config.engine_path = engine;
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }
    config.validate()?;

    let config = Arc::new(config);
    info!(
        engine = %config.engine_path().display(),
        work_dir = %config.work_dir.display(),
        "configuration loaded"
    );

    // ── Start the API ───────────────────────────────────
    let controller = Arc::new(SessionController::new(Arc::clone(&config)));
    let ct = CancellationToken::new();

    let mut http_handle = tokio::spawn(serve_http(Arc::clone(&controller), ct.clone()));
    info!(port = config.http_port, "simdeck ready");

    // ── Wait for shutdown signal or an early API failure ─
    let early_exit = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
        joined = &mut http_handle => Some(joined),
    };
    ct.cancel();
    controller.shutdown();

    let joined = match early_exit {
        Some(joined) => joined,
        None => http_handle.await,
    };
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(%err, "HTTP API failed");
            return Err(err);
        }
        Err(err) => return Err(AppError::Http(format!("HTTP task failed: {err}"))),
    }

    info!("simdeck shut down");
    Ok(())
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
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

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
