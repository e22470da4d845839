//! Open-connection bookkeeping for the HTTP server.
//!
//! Every accepted connection holds a [`ConnectionGuard`] for as long as its
//! task lives. Shutdown reads [`ConnectionTracker::active_count`] to report
//! how much it is draining.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one connection in log lines. Unique per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Counts {
    issued: AtomicU64,
    open: AtomicU64,
}

/// Hands out connection ids and counts the connections still open.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    counts: Arc<Counts>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted connection until the guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        let id = ConnectionId(self.counts.issued.fetch_add(1, Ordering::Relaxed) + 1);
        self.counts.open.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            counts: Arc::clone(&self.counts),
            id,
        }
    }

    pub fn active_count(&self) -> u64 {
        self.counts.open.load(Ordering::SeqCst)
    }
}

/// Held by a connection task; releases its slot on drop, also when aborted.
#[derive(Debug)]
pub struct ConnectionGuard {
    counts: Arc<Counts>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counts.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
