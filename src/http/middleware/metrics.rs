//! Metrics middleware.
//! Counts every request and every failed request without touching the outcome.

use std::sync::Arc;

use crate::http::handler::{handler, middleware, Handler, Middleware};
use crate::observability::metrics::ProcessCounters;

/// Update `counters` after each request completes.
///
/// Panics from the inner handler are not intercepted here; put [`super::panics`]
/// inside this layer to have them counted as errors.
pub fn metrics(counters: Arc<ProcessCounters>) -> Middleware {
    middleware(move |before: Handler| {
        let counters = Arc::clone(&counters);
        handler(move |request| {
            let before = Arc::clone(&before);
            let counters = Arc::clone(&counters);
            async move {
                let result = before(request).await;
                counters.record(result.is_err());
                result
            }
        })
    })
}
