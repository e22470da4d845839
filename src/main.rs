//! Sales API (v1)
//!
//! A small products service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server ──▶ routing::api
//!                                                           │
//!                                   logger → metrics → timeout → panics → handler
//!                                                           │
//!     Client Response ◀─────────────────────────────────────┘
//!
//!     Debug listener: /debug/vars, /debug/readiness
//!     Signals: SIGINT / SIGTERM → drain in-flight requests → exit
//! ```

use std::path::PathBuf;

use clap::Parser;

use sales_api::lifecycle::signals;
use sales_api::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "sales-api")]
#[command(about = "Sales API service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    config_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = StartupOptions {
        config_path: cli.config,
        config_only: cli.config_only,
    };

    if let Err(e) = startup::run(options, signals::termination()).await {
        tracing::error!(error = %e, "sales-api stopped with error");
        return Err(e.into());
    }
    Ok(())
}
