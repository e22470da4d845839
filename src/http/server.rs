//! HTTP server lifecycle.
//!
//! # Responsibilities
//! - Bind the listener and run the accept loop on its own task
//! - Serve each connection on its own task with hyper
//! - Race listener failure against the shutdown signal
//! - Drain in-flight connections within the shutdown deadline, then force close
//!
//! # State Machine
//! ```text
//! Starting ──bind ok──▶ Running ──signal──▶ ShuttingDown ──drained / forced──▶ Stopped
//!    │                     │
//!    └──bind error─────────┴──listener error──▶ Failed
//! ```

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::config::WebConfig;
use crate::lifecycle::{LifecycleState, Shutdown, ShutdownSignal};
use crate::net::{Accept, ConnectionTracker, Listener, ListenerError};

/// Settings the server takes as already-validated input.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Time allowed for a client to send request headers.
    pub read_timeout: Duration,
    /// How long shutdown waits for in-flight requests before forcing close.
    pub shutdown_timeout: Duration,
    /// Maximum concurrently open connections.
    pub max_connections: usize,
}

impl From<&WebConfig> for ServerSettings {
    fn from(config: &WebConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            shutdown_timeout: config.shutdown_timeout(),
            max_connections: config.max_connections,
        }
    }
}

/// Error ending the server without a requested shutdown.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("listener stopped before shutdown was requested")]
    UnexpectedStop,
    #[error("accept loop failed: {0}")]
    AcceptTask(#[from] JoinError),
}

/// How a requested shutdown finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// Every in-flight connection finished before the deadline.
    Graceful,
    /// The deadline passed and remaining connections were dropped.
    Forced,
}

/// HTTP server for the sales API.
pub struct HttpServer {
    app: Router,
    settings: ServerSettings,
    state: watch::Sender<LifecycleState>,
}

impl HttpServer {
    /// Create a server for `app`.
    ///
    /// Request deadlines belong to the handler chain, so the server never cuts
    /// a request short before the handler's middleware has observed it.
    pub fn new(app: Router, settings: ServerSettings) -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            app,
            settings,
            state,
        }
    }

    /// Observe lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Get a reference to the settings.
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Bind `address`, then serve until `signal` resolves or the listener fails.
    pub async fn run<F>(self, address: &str, signal: F) -> Result<Stopped, ServeError>
    where
        F: Future<Output = ()> + Send,
    {
        match Listener::bind(address, self.settings.max_connections).await {
            Ok(listener) => self.serve(listener, signal).await,
            Err(e) => {
                self.transition(LifecycleState::Failed);
                Err(e.into())
            }
        }
    }

    /// Serve on an already bound listener until `signal` resolves or the
    /// listener fails.
    ///
    /// A listener failure is returned as an error. A shutdown requested through
    /// `signal` always returns `Ok`, also when connections had to be forced.
    pub async fn serve<L, F>(self, listener: L, signal: F) -> Result<Stopped, ServeError>
    where
        L: Accept,
        F: Future<Output = ()> + Send,
    {
        let address = listener.local_addr().ok();
        let drain = Shutdown::new();
        let tracker = ConnectionTracker::new();

        let mut accept_task = tokio::spawn(accept_loop(
            listener,
            self.app.clone(),
            connection_builder(&self.settings),
            drain.subscribe(),
            tracker.clone(),
        ));

        self.transition(LifecycleState::Running);
        tracing::info!(address = ?address, "HTTP server running");

        tokio::select! {
            joined = &mut accept_task => {
                self.transition(LifecycleState::Failed);
                let error = match joined {
                    Ok(Ok(_)) => ServeError::UnexpectedStop,
                    Ok(Err(e)) => e.into(),
                    Err(e) => e.into(),
                };
                tracing::error!(error = %error, "HTTP server failed");
                Err(error)
            }
            _ = signal => {
                self.transition(LifecycleState::ShuttingDown);
                let stopped = self.shut_down(drain, accept_task, &tracker).await;
                self.transition(LifecycleState::Stopped);
                tracing::info!(outcome = ?stopped, "HTTP server stopped");
                Ok(stopped)
            }
        }
    }

    async fn shut_down(
        &self,
        drain: Shutdown,
        accept_task: JoinHandle<Result<JoinSet<()>, ListenerError>>,
        tracker: &ConnectionTracker,
    ) -> Stopped {
        drain.trigger();

        let mut connections = match accept_task.await {
            Ok(Ok(connections)) => connections,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Listener failed while shutting down");
                return Stopped::Forced;
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept loop failed while shutting down");
                return Stopped::Forced;
            }
        };

        let deadline = self.settings.shutdown_timeout;
        tracing::info!(
            in_flight = tracker.active_count(),
            deadline_ms = deadline.as_millis() as u64,
            "Draining connections"
        );

        if tokio::time::timeout(deadline, drain_connections(&mut connections))
            .await
            .is_ok()
        {
            return Stopped::Graceful;
        }

        tracing::warn!(
            remaining = connections.len(),
            "Graceful shutdown timed out, forcing connections closed"
        );
        force_close(connections).await;
        Stopped::Forced
    }

    fn transition(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "Lifecycle transition");
    }
}

/// HTTP/1 only: every request of a connection then runs inside that
/// connection's task, which is what a forced close aborts.
fn connection_builder(settings: &ServerSettings) -> Builder<TokioExecutor> {
    let mut builder = Builder::new(TokioExecutor::new()).http1_only();
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(settings.read_timeout);
    builder
}

/// Accept connections until `stop` fires, handing back the open connections.
async fn accept_loop<L: Accept>(
    listener: L,
    app: Router,
    builder: Builder<TokioExecutor>,
    mut stop: ShutdownSignal,
    tracker: ConnectionTracker,
) -> Result<JoinSet<()>, ListenerError> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = stop.recv() => {
                tracing::info!(open = connections.len(), "Listener closed to new connections");
                return Ok(connections);
            }
            accepted = listener.accept() => {
                let (stream, peer_addr, permit) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) if e.is_connection_error() => {
                        tracing::debug!(error = %e, "Skipping failed connection");
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let guard = tracker.track();
                let service = TowerToHyperService::new(app.clone());
                let builder = builder.clone();
                let mut stop = stop.clone();

                connections.spawn(async move {
                    let _permit = permit;
                    let connection = builder.serve_connection(TokioIo::new(stream), service);
                    tokio::pin!(connection);

                    let result = tokio::select! {
                        result = connection.as_mut() => result,
                        _ = stop.recv() => {
                            connection.as_mut().graceful_shutdown();
                            connection.await
                        }
                    };

                    if let Err(e) = result {
                        tracing::debug!(
                            connection_id = %guard.id(),
                            peer_addr = %peer_addr,
                            error = %e,
                            "Connection ended with error"
                        );
                    }
                });
            }
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                log_connection_exit(joined);
            }
        }
    }
}

async fn drain_connections(connections: &mut JoinSet<()>) {
    while let Some(joined) = connections.join_next().await {
        log_connection_exit(joined);
    }
}

/// Abort every remaining connection and wait for the tasks to unwind.
///
/// Failures are logged only; a forced close never fails the shutdown.
async fn force_close(mut connections: JoinSet<()>) {
    connections.abort_all();
    let mut failed = 0usize;
    while let Some(joined) = connections.join_next().await {
        match joined {
            Err(e) if e.is_panic() => {
                failed += 1;
                tracing::error!(error = %e, "Connection task failed during forced close");
            }
            _ => {}
        }
    }
    tracing::warn!(failed, "Forced close complete");
}

fn log_connection_exit(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!(error = %e, "Connection task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::net::TcpStream;

    use crate::net::ConnectionPermit;

    /// Accept source whose socket goes bad: `resets` peer resets, then a
    /// listener-level error.
    struct FailingListener {
        resets: usize,
        calls: Arc<AtomicUsize>,
    }

    impl Accept for FailingListener {
        type Stream = TcpStream;

        async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let kind = if call < self.resets {
                io::ErrorKind::ConnectionReset
            } else {
                io::ErrorKind::PermissionDenied
            };
            Err(ListenerError::Accept(io::Error::from(kind)))
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            Ok(SocketAddr::from(([127, 0, 0, 1], 0)))
        }
    }

    fn settings() -> ServerSettings {
        ServerSettings {
            read_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(1),
            max_connections: 8,
        }
    }

    #[tokio::test]
    async fn listener_failure_before_signal_is_fatal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener = FailingListener {
            resets: 3,
            calls: Arc::clone(&calls),
        };
        let server = HttpServer::new(Router::new(), settings());
        let state = server.state();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.serve(listener, std::future::pending()),
        )
        .await
        .expect("serve did not return after listener failure");

        assert!(matches!(
            result,
            Err(ServeError::Listener(ListenerError::Accept(_)))
        ));
        assert_eq!(*state.borrow(), LifecycleState::Failed);
        // Resets were skipped; only the fourth error ended the loop.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn signal_wins_over_idle_listener() {
        let listener = Listener::bind("127.0.0.1:0", 8).await.unwrap();
        let server = HttpServer::new(Router::new(), settings());
        let state = server.state();

        let stopped = server.serve(listener, async {}).await.unwrap();

        assert_eq!(stopped, Stopped::Graceful);
        assert_eq!(*state.borrow(), LifecycleState::Stopped);
    }
}
