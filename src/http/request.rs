//! Request decoding helpers for handlers.
//!
//! Handlers receive the raw request; these helpers run axum's extractors and
//! turn their rejections into [`WebError`]s with a 400 status.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::error::WebError;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Decode a JSON request body.
pub async fn decode<T>(request: Request) -> Result<T, WebError>
where
    T: DeserializeOwned,
{
    let Json(value) = Json::<T>::from_request(request, &())
        .await
        .map_err(|rejection| WebError::bad_request(rejection.body_text()))?;
    Ok(value)
}

/// Read the single `{id}` path parameter as a UUID.
pub async fn path_id(parts: &mut Parts) -> Result<Uuid, WebError> {
    let Path(raw) = Path::<String>::from_request_parts(parts, &())
        .await
        .map_err(|rejection| WebError::bad_request(rejection.body_text()))?;

    Uuid::parse_str(&raw).map_err(|_| WebError::bad_request("ID is not in its proper form"))
}

/// The request id set by the request-id layer, if any.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
