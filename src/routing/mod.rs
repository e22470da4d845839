//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table (at startup):
//!     Database handle + ProcessCounters
//!     → Products handlers
//!     → App::handle wraps each with logger → metrics → timeout → panics
//!     → Freeze as immutable axum Router
//!
//! Incoming Request
//!     → axum path/method match
//!     → wrapped business handler
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - Every registered route gets the same middleware chain
//! - Unmatched paths and methods never reach the chain and are not counted

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::MethodFilter, Router};

use crate::database::Database;
use crate::http::middleware::{logger, metrics, panics, timeout};
use crate::http::{handler, App};
use crate::observability::metrics::ProcessCounters;
use crate::products::Products;

/// Build the sales API route table.
///
/// `write_timeout` bounds how long a handler may take to produce its response.
pub fn api(db: Database, counters: Arc<ProcessCounters>, write_timeout: Duration) -> Router {
    let products = Products::new(db);

    let list = products.clone();
    let create = products.clone();
    let retrieve = products;

    App::new(vec![
        logger(),
        metrics(counters),
        timeout(write_timeout),
        panics(),
    ])
        .handle(
            MethodFilter::GET,
            "/v1/products",
            handler(move |request| list.clone().list(request)),
        )
        .handle(
            MethodFilter::POST,
            "/v1/products",
            handler(move |request| create.clone().create(request)),
        )
        .handle(
            MethodFilter::GET,
            "/v1/products/{id}",
            handler(move |request| retrieve.clone().retrieve(request)),
        )
        .into_router()
}
