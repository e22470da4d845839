//! Panic containment middleware.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::http::error::WebError;
use crate::http::handler::{handler, middleware, Handler, Middleware};

/// Turn a panic in the inner handler into a 500 [`WebError`].
pub fn panics() -> Middleware {
    middleware(|before: Handler| {
        handler(move |request| {
            let before = Arc::clone(&before);
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            // The call happens inside the async block so a panic raised
            // before the first poll is caught as well.
            AssertUnwindSafe(async move { before(request).await })
                .catch_unwind()
                .map(move |outcome| match outcome {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(%method, %path, panic = %message, "Handler panicked");
                        Err(WebError::internal(format!("panic: {message}")))
                    }
                })
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
