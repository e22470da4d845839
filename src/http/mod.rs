//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, hyper connection task, lifecycle)
//!     → app.rs (axum router built from the route table)
//!     → middleware/ (logger → metrics → timeout → panics)
//!     → business handler (returns Response or WebError)
//!     → error.rs (WebError rendered at the router boundary)
//!     → Send to client
//! ```

pub mod app;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use app::App;
pub use error::{FieldError, WebError};
pub use handler::{handler, middleware, wrap_middleware, Handler, HandlerFuture, HandlerResult, Middleware};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServeError, ServerSettings, Stopped};
