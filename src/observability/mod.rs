//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (process counters, mirrored to Prometheus)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → debug.rs endpoints (/debug/vars, /debug/readiness)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows into every request log line
//! - Metrics are cheap (atomic increments)

pub mod debug;
pub mod logging;
pub mod metrics;

pub use metrics::{CounterSnapshot, ProcessCounters};
