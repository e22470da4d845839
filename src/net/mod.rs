//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limit permit)
//!     → connection.rs (id, open-connection count)
//!     → Hand off to the HTTP server's connection task
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Permits and guards release on drop, so aborted tasks clean up

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Accept, ConnectionPermit, Listener, ListenerError};
