//! Debug endpoints, served on their own listener.
//!
//! - `GET /debug/vars`: the process counters as JSON
//! - `GET /debug/readiness`: 200 while the API server is running, 503 otherwise

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::sync::watch;

use crate::lifecycle::LifecycleState;
use crate::observability::metrics::{CounterSnapshot, ProcessCounters};

#[derive(Clone)]
struct DebugState {
    counters: Arc<ProcessCounters>,
    lifecycle: watch::Receiver<LifecycleState>,
}

/// Build the debug router.
pub fn router(counters: Arc<ProcessCounters>, lifecycle: watch::Receiver<LifecycleState>) -> Router {
    Router::new()
        .route("/debug/vars", get(vars))
        .route("/debug/readiness", get(readiness))
        .with_state(DebugState {
            counters,
            lifecycle,
        })
}

async fn vars(State(state): State<DebugState>) -> Json<CounterSnapshot> {
    Json(state.counters.snapshot())
}

async fn readiness(State(state): State<DebugState>) -> Response {
    let current = *state.lifecycle.borrow();
    let status = if current == LifecycleState::Running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let label = if status == StatusCode::OK { "ok" } else { current.as_str() };
    (status, Json(json!({ "status": label }))).into_response()
}
