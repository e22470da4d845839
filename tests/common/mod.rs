//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use sales_api::http::{HttpServer, ServeError, ServerSettings, Stopped};
use sales_api::lifecycle::{LifecycleState, Shutdown};
use sales_api::net::Listener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A server started on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<LifecycleState>,
    pub handle: JoinHandle<Result<Stopped, ServeError>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request shutdown and wait for `serve` to return.
    pub async fn stop(self) -> Result<Stopped, ServeError> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

pub fn settings(shutdown_timeout: Duration) -> ServerSettings {
    ServerSettings {
        read_timeout: Duration::from_secs(5),
        shutdown_timeout,
        max_connections: 100,
    }
}

/// Serve `app` on 127.0.0.1:0 and wait until the server reports running.
pub async fn start_server(app: Router, settings: ServerSettings) -> RunningServer {
    let listener = Listener::bind("127.0.0.1:0", settings.max_connections)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(app, settings);
    let mut state = server.state();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    let handle = tokio::spawn(server.serve(listener, signal.wait()));

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == LifecycleState::Running),
    )
    .await
    .expect("server did not start")
    .expect("server state channel closed");

    RunningServer {
        addr,
        shutdown,
        state,
        handle,
    }
}

/// A client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
