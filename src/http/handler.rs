//! Handler abstraction.
//!
//! A [`Handler`] turns one request into either a finished response or a
//! [`WebError`]. A [`Middleware`] wraps a handler and returns a handler of the
//! same shape, so cross-cutting behavior composes by plain function wrapping:
//!
//! ```text
//! logger( metrics( panics( business handler ) ) )
//!   outermost middleware sees the outcome of every inner layer last
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::{extract::Request, response::Response};
use futures_util::future::BoxFuture;

use crate::http::error::WebError;

/// Outcome of handling one request.
///
/// `Ok` means the handler produced the complete response. `Err` means it did
/// not, and the error is left for an outer layer to render.
pub type HandlerResult = Result<Response, WebError>;

/// Boxed future returned by a [`Handler`].
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Handle one request, optionally failing.
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Transform a handler into a new handler with added behavior.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Build a [`Handler`] from an async function or closure.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |request| Box::pin(f(request)))
}

/// Build a [`Middleware`] from a wrapping function.
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap `handler` with `middleware`, first element outermost.
pub fn wrap_middleware(middleware: &[Middleware], handler: Handler) -> Handler {
    middleware
        .iter()
        .rev()
        .fold(handler, |inner, wrap| wrap(inner))
}
