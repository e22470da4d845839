//! Response helpers for handlers.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::http::handler::HandlerResult;

/// Respond with `value` encoded as JSON and the given status.
pub fn respond<T>(status: StatusCode, value: &T) -> HandlerResult
where
    T: Serialize + ?Sized,
{
    Ok((status, Json(value)).into_response())
}

/// Status recorded for logging, whichever way the handler finished.
pub fn outcome_status(result: &HandlerResult) -> StatusCode {
    match result {
        Ok(response) => response.status(),
        Err(error) => error.status(),
    }
}
