//! Request deadline middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use crate::http::error::WebError;
use crate::http::handler::{handler, middleware, Handler, Middleware};

/// Fail a request with 503 when the inner handler runs past `limit`.
///
/// The inner future is dropped at the deadline. Register this inside
/// [`super::metrics`] so a timed-out request is still counted as an error.
pub fn timeout(limit: Duration) -> Middleware {
    middleware(move |before: Handler| {
        handler(move |request| {
            let before = Arc::clone(&before);
            let path = request.uri().path().to_string();
            async move {
                match tokio::time::timeout(limit, before(request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            %path,
                            limit_ms = limit.as_millis() as u64,
                            "Handler exceeded write timeout"
                        );
                        Err(WebError::new(
                            StatusCode::SERVICE_UNAVAILABLE,
                            "request timed out",
                        ))
                    }
                }
            }
        })
    })
}
