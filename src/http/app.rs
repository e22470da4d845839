//! Application: binds handlers to routes behind the middleware chain.

use std::sync::Arc;

use axum::{extract::Request, routing::{on, MethodFilter}, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::handler::{wrap_middleware, Handler, Middleware};

/// Route registry that wraps every handler with the same middleware.
///
/// Holds no per-request state; everything request-scoped travels in the
/// request itself.
pub struct App {
    router: Router,
    middleware: Vec<Middleware>,
}

impl App {
    /// Create an application whose handlers are wrapped by `middleware`,
    /// first element outermost.
    pub fn new(middleware: Vec<Middleware>) -> Self {
        Self {
            router: Router::new(),
            middleware,
        }
    }

    /// Register `handler` for `method` on `path`.
    ///
    /// # Panics
    /// Panics on an invalid path pattern or a method already registered for
    /// `path`. Route setup is a programming error and must fail at startup.
    pub fn handle(mut self, method: MethodFilter, path: &str, handler: Handler) -> Self {
        let handler = wrap_middleware(&self.middleware, handler);
        let endpoint = move |request: Request| {
            let handler = Arc::clone(&handler);
            async move { handler(request).await }
        };

        tracing::debug!(path, "Route registered");
        self.router = self.router.route(path, on(method, endpoint));
        self
    }

    /// Finish construction, yielding the transport-facing dispatch entry point.
    ///
    /// Failed handler results are rendered through `WebError`'s response.
    pub fn into_router(self) -> Router {
        self.router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }
}
