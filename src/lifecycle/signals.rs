//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM
//! - Resolve a single future when either arrives
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Both signals trigger the same graceful shutdown
//! - A handler that cannot be installed is logged and never fires

use tokio::signal;

/// Wait for an interrupt (Ctrl+C) or terminate signal.
pub async fn termination() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!(signal = "interrupt", "Shutdown signal received"),
        _ = terminate => tracing::info!(signal = "terminate", "Shutdown signal received"),
    }
}
