//! Product endpoints.

use axum::{extract::Request, http::StatusCode};

use crate::database::Database;
use crate::http::request::{decode, path_id};
use crate::http::response::respond;
use crate::http::{HandlerResult, WebError};
use crate::products::NewProduct;

/// Handlers for the `/v1/products` resource.
#[derive(Debug, Clone)]
pub struct Products {
    db: Database,
}

impl Products {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// `GET /v1/products`
    pub async fn list(self, _request: Request) -> HandlerResult {
        let products = self.db.list_products();
        respond(StatusCode::OK, &products)
    }

    /// `POST /v1/products`
    pub async fn create(self, request: Request) -> HandlerResult {
        let new: NewProduct = decode(request).await?;
        new.validate()?;

        let product = self.db.create_product(new);
        tracing::info!(product_id = %product.id, "Product created");
        respond(StatusCode::CREATED, &product)
    }

    /// `GET /v1/products/{id}`
    pub async fn retrieve(self, request: Request) -> HandlerResult {
        let (mut parts, _body) = request.into_parts();
        let id = path_id(&mut parts).await?;

        match self.db.get_product(id) {
            Some(product) => respond(StatusCode::OK, &product),
            None => Err(WebError::not_found("product not found")),
        }
    }
}
