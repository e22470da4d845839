//! Request logging middleware.

use std::sync::Arc;
use std::time::Instant;

use crate::http::handler::{handler, middleware, Handler, Middleware};
use crate::http::request::request_id;
use crate::http::response::outcome_status;

/// Log one line per request once the inner layers have finished.
pub fn logger() -> Middleware {
    middleware(|before: Handler| {
        handler(move |request| {
            let before = Arc::clone(&before);
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let request_id = request_id(request.headers()).to_string();
            async move {
                let started = Instant::now();
                let result = before(request).await;
                let status = outcome_status(&result);
                let elapsed_ms = started.elapsed().as_millis() as u64;

                match &result {
                    Ok(_) => tracing::info!(
                        request_id = %request_id,
                        %method,
                        %path,
                        status = status.as_u16(),
                        elapsed_ms,
                        "Request completed"
                    ),
                    Err(e) if status.is_server_error() => tracing::error!(
                        request_id = %request_id,
                        %method,
                        %path,
                        status = status.as_u16(),
                        elapsed_ms,
                        error = %e,
                        cause = e.cause().unwrap_or("-"),
                        "Request failed"
                    ),
                    Err(e) => tracing::warn!(
                        request_id = %request_id,
                        %method,
                        %path,
                        status = status.as_u16(),
                        elapsed_ms,
                        error = %e,
                        "Request rejected"
                    ),
                }

                result
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{wrap_middleware, WebError};
    use axum::{body::Body, extract::Request, http::StatusCode, response::IntoResponse};

    fn request() -> Request {
        axum::http::Request::builder()
            .uri("/v1/products")
            .header("x-request-id", "abc")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn passes_success_through() {
        let ok = handler(|_| async { Ok(StatusCode::CREATED.into_response()) });
        let response = wrap_middleware(&[logger()], ok)(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn passes_failure_through() {
        let failing = handler(|_| async { Err(WebError::internal("db gone")) });
        let err = wrap_middleware(&[logger()], failing)(request())
            .await
            .unwrap_err();
        assert_eq!(err.cause(), Some("db gone"));
    }
}
