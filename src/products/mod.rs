//! Products: the inventory resource.
//!
//! `model.rs` holds the wire types and validation; `handlers.rs` holds the
//! business handlers the route table binds to `/v1/products`. Handlers write
//! their own failure status through [`WebError`](crate::http::WebError).

pub mod handlers;
pub mod model;

pub use handlers::Products;
pub use model::{NewProduct, Product};
