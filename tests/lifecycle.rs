//! Server lifecycle tests: startup, graceful drain, forced close, failures.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{http::StatusCode, routing::MethodFilter, Router};
use serde_json::json;
use tokio::sync::Notify;

use sales_api::config::Config;
use sales_api::http::response::respond;
use sales_api::http::middleware::{metrics, timeout};
use sales_api::http::{handler, App, HttpServer, ServeError, Stopped};
use sales_api::lifecycle::startup;
use sales_api::lifecycle::LifecycleState;
use sales_api::observability::ProcessCounters;

mod common;

/// A router with one GET /slow route that signals `started` and then sleeps.
fn slow_app(started: Arc<Notify>, delay: Duration) -> Router {
    App::new(Vec::new())
        .handle(
            MethodFilter::GET,
            "/slow",
            handler(move |_| {
                let started = Arc::clone(&started);
                async move {
                    started.notify_one();
                    tokio::time::sleep(delay).await;
                    respond(StatusCode::OK, &json!({"status": "done"}))
                }
            }),
        )
        .into_router()
}

#[tokio::test]
async fn test_shutdown_without_requests_is_graceful() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(started, Duration::from_millis(10)),
        common::settings(Duration::from_secs(5)),
    )
    .await;

    let begun = Instant::now();
    let stopped = server.stop().await.unwrap();

    assert_eq!(stopped, Stopped::Graceful);
    assert!(begun.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_in_flight_request_completes_during_shutdown() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(Arc::clone(&started), Duration::from_millis(300)),
        common::settings(Duration::from_secs(5)),
    )
    .await;

    let client = common::client();
    let url = server.url("/slow");
    let request = tokio::spawn(async move { client.get(url).send().await });

    started.notified().await;
    let stopped = server.stop().await.unwrap();
    assert_eq!(stopped, Stopped::Graceful);

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "done");
}

#[tokio::test]
async fn test_shutdown_deadline_forces_close() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(Arc::clone(&started), Duration::from_secs(3)),
        common::settings(Duration::from_millis(200)),
    )
    .await;

    let client = common::client();
    let url = server.url("/slow");
    let request = tokio::spawn(async move { client.get(url).send().await });

    started.notified().await;
    let begun = Instant::now();
    let stopped = server.stop().await.unwrap();

    assert_eq!(stopped, Stopped::Forced);
    assert!(begun.elapsed() < Duration::from_secs(2));

    // The connection was dropped before the handler answered.
    assert!(request.await.unwrap().is_err());
}

#[tokio::test]
async fn test_new_connections_refused_after_shutdown() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(started, Duration::from_millis(10)),
        common::settings(Duration::from_secs(1)),
    )
    .await;

    let url = server.url("/slow");
    assert_eq!(server.stop().await.unwrap(), Stopped::Graceful);

    let result = common::client().get(url).send().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_lifecycle_states() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(started, Duration::from_millis(10)),
        common::settings(Duration::from_secs(1)),
    )
    .await;

    let mut state = server.state.clone();
    assert_eq!(*state.borrow_and_update(), LifecycleState::Running);

    server.stop().await.unwrap();
    assert_eq!(*state.borrow(), LifecycleState::Stopped);
    assert!(state.borrow().is_terminal());
}

#[tokio::test]
async fn test_bind_failure_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = taken.local_addr().unwrap().to_string();

    let server = HttpServer::new(Router::new(), common::settings(Duration::from_secs(1)));
    let state = server.state();
    assert_eq!(*state.borrow(), LifecycleState::Starting);

    let result = server.run(&address, std::future::pending()).await;

    assert!(matches!(result, Err(ServeError::Listener(_))));
    assert_eq!(*state.borrow(), LifecycleState::Failed);
}

#[tokio::test]
async fn test_startup_serves_until_signal() {
    let mut config = Config::default();
    config.web.address = "127.0.0.1:0".into();
    config.observability.debug_address = "127.0.0.1:0".into();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let signal = async move {
        let _ = rx.await;
    };

    let serving = tokio::spawn(startup::serve(config, signal));
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("startup did not stop after signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_startup_reports_debug_bind_failure() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

    let mut config = Config::default();
    config.web.address = "127.0.0.1:0".into();
    config.observability.debug_address = taken.local_addr().unwrap().to_string();

    let result = startup::serve(config, std::future::pending()).await;
    assert!(matches!(result, Err(startup::StartupError::DebugListener(_))));
}

#[tokio::test]
async fn test_startup_rejects_bad_metrics_address() {
    let mut config = Config::default();
    config.web.address = "127.0.0.1:0".into();
    config.observability.debug_address = "127.0.0.1:0".into();
    config.observability.metrics_enabled = true;
    config.observability.metrics_address = "not-an-address".into();

    let result = startup::serve(config, std::future::pending()).await;
    assert!(matches!(result, Err(startup::StartupError::MetricsAddress(_))));
}

#[tokio::test]
async fn test_write_timeout_is_counted_as_error() {
    let counters = Arc::new(ProcessCounters::with_sampler(|| 0));
    let app = App::new(vec![
        metrics(Arc::clone(&counters)),
        timeout(Duration::from_millis(100)),
    ])
    .handle(
        MethodFilter::GET,
        "/slow",
        handler(|_| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            respond(StatusCode::OK, &json!({"status": "done"}))
        }),
    )
    .into_router();

    let server = common::start_server(app, common::settings(Duration::from_secs(1))).await;
    let response = common::client().get(server.url("/slow")).send().await.unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(counters.requests(), 1);
    assert_eq!(counters.errors(), 1);
    assert_eq!(server.stop().await.unwrap(), Stopped::Graceful);
}

#[tokio::test]
async fn test_http2_connections_are_refused() {
    let started = Arc::new(Notify::new());
    let server = common::start_server(
        slow_app(started, Duration::from_millis(10)),
        common::settings(Duration::from_secs(1)),
    )
    .await;

    let h2 = reqwest::Client::builder()
        .http2_prior_knowledge()
        .build()
        .unwrap();
    assert!(h2.get(server.url("/slow")).send().await.is_err());

    let response = common::client().get(server.url("/slow")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    server.stop().await.unwrap();
}
