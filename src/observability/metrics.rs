//! Process counters and metrics exposition.
//!
//! # Responsibilities
//! - Own the process-wide request/error/task counters
//! - Mirror them into the `metrics` facade for Prometheus scraping
//! - Provide a read-only snapshot for the debug endpoint
//!
//! # Metrics
//! - `sales_api_requests_total` (counter): requests handled by the API
//! - `sales_api_errors_total` (counter): requests whose handler failed
//! - `sales_api_tasks` (gauge): live runtime tasks, sampled every 100 requests
//!
//! # Design Decisions
//! - Counters live in one owned instance shared through `Arc`, never global
//! - Low-overhead updates (relaxed atomics; only the totals must be exact)
//! - Counters only move forward: no reset, no decrement

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use serde::Serialize;

/// The task gauge is refreshed when the request total hits a multiple of this.
pub const TASK_SAMPLE_INTERVAL: u64 = 100;

type Sampler = Box<dyn Fn() -> u64 + Send + Sync>;

/// Process-wide counters updated by the metrics middleware.
pub struct ProcessCounters {
    tasks: AtomicU64,
    requests: AtomicU64,
    errors: AtomicU64,
    sampler: Sampler,
}

/// Point-in-time view of [`ProcessCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub tasks: u64,
    pub requests: u64,
    pub errors: u64,
}

impl ProcessCounters {
    /// Counters whose gauge samples the live task count of the current runtime.
    pub fn new() -> Self {
        Self::with_sampler(live_tasks)
    }

    /// Counters with a custom gauge source.
    pub fn with_sampler<F>(sampler: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        Self {
            tasks: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            sampler: Box::new(sampler),
        }
    }

    /// Record the outcome of one handled request.
    ///
    /// The new total comes from the increment itself, so exactly one caller
    /// observes each multiple of [`TASK_SAMPLE_INTERVAL`] even under contention.
    pub fn record(&self, failed: bool) {
        let total = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        ::metrics::counter!("sales_api_requests_total").increment(1);

        if total % TASK_SAMPLE_INTERVAL == 0 {
            let tasks = (self.sampler)();
            self.tasks.store(tasks, Ordering::Relaxed);
            ::metrics::gauge!("sales_api_tasks").set(tasks as f64);
        }

        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
            ::metrics::counter!("sales_api_errors_total").increment(1);
        }
    }

    pub fn tasks(&self) -> u64 {
        self.tasks.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            tasks: self.tasks(),
            requests: self.requests(),
            errors: self.errors(),
        }
    }
}

impl Default for ProcessCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProcessCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCounters")
            .field("tasks", &self.tasks())
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

/// Live tasks on the current tokio runtime, or 0 outside of one.
fn live_tasks() -> u64 {
    tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_alive_tasks() as u64)
        .unwrap_or(0)
}

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}
