//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize all subsystems in dependency order
//! - Start the debug listener
//! - Hand the API router to the HTTP server and wait for it to stop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The API listener starts last (traffic only when ready)

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::{load_or_default, Config, ConfigError};
use crate::database::{seed, Database, DatabaseError};
use crate::http::{HttpServer, ServeError, ServerSettings, Stopped};
use crate::lifecycle::LifecycleState;
use crate::observability::{debug, logging, metrics, ProcessCounters};
use crate::routing;

/// What the command line asked for.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML configuration file; defaults are used when absent.
    pub config_path: Option<PathBuf>,
    /// Print the effective configuration and exit.
    pub config_only: bool,
}

/// Error type for anything that stops the service from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("loading config: {0}")]
    Config(#[from] ConfigError),
    #[error("encoding config: {0}")]
    EncodeConfig(#[from] serde_json::Error),
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[source] std::net::AddrParseError),
    #[error("starting metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("seeding database: {0}")]
    Seed(#[from] DatabaseError),
    #[error("binding debug listener: {0}")]
    DebugListener(#[source] std::io::Error),
    #[error("listening and serving: {0}")]
    Serve(#[from] ServeError),
}

/// Run the service until `signal` resolves or the server fails.
pub async fn run<F>(options: StartupOptions, signal: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send,
{
    let config = load_or_default(options.config_path.as_deref())?;

    if options.config_only {
        let encoded = serde_json::to_string_pretty(&config)?;
        println!("{encoded}");
        return Ok(());
    }

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sales-api starting");
    tracing::info!(
        address = %config.web.address,
        read_timeout_secs = config.web.read_timeout_secs,
        write_timeout_secs = config.web.write_timeout_secs,
        shutdown_timeout_secs = config.web.shutdown_timeout_secs,
        "Configuration loaded"
    );

    serve(config, signal).await
}

/// Start every subsystem from an already loaded configuration.
///
/// Logging is left to the caller.
pub async fn serve<F>(config: Config, signal: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send,
{
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .map_err(StartupError::MetricsAddress)?;
        metrics::init_metrics(addr)?;
    }

    let db = Database::open();
    if config.database.seed {
        seed::seed(&db)?;
    }

    let counters = Arc::new(ProcessCounters::new());
    let server = HttpServer::new(
        routing::api(db, Arc::clone(&counters), config.web.write_timeout()),
        ServerSettings::from(&config.web),
    );

    start_debug(&config.observability.debug_address, counters, server.state()).await?;

    match server.run(&config.web.address, signal).await? {
        Stopped::Graceful => tracing::info!("Shutdown complete"),
        Stopped::Forced => tracing::warn!("Shutdown complete after forcing connections closed"),
    }
    Ok(())
}

async fn start_debug(
    address: &str,
    counters: Arc<ProcessCounters>,
    lifecycle: watch::Receiver<LifecycleState>,
) -> Result<(), StartupError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(StartupError::DebugListener)?;
    let local_addr = listener.local_addr().map_err(StartupError::DebugListener)?;
    tracing::info!(address = %local_addr, "Debug listener bound");

    let app = debug::router(counters, lifecycle);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Debug listener failed");
        }
    });
    Ok(())
}
