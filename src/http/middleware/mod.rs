//! Handler middleware.
//!
//! Each middleware is a [`Middleware`](crate::http::Middleware): it wraps a
//! handler and returns a handler of the same shape. The API registers them as
//! `logger → metrics → timeout → panics`, so a contained panic or a missed
//! deadline is still logged and counted.

pub mod logger;
pub mod metrics;
pub mod panics;
pub mod timeout;

pub use logger::logger;
pub use metrics::metrics;
pub use panics::panics;
pub use timeout::timeout;
