//! Sales API service library.

pub mod config;
pub mod database;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod products;
pub mod routing;

pub use config::Config;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
