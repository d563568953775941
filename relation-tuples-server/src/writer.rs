//! Rendering of read results and failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use relation_tuples::GetResponse;
use uuid::Uuid;

use crate::error::ApiError;

/// Turns handler outcomes into HTTP responses.
///
/// Injected into the server state so handlers never pick a wire format
/// themselves.
pub trait ResponseWriter: Send + Sync {
    fn write(&self, request_id: Uuid, response: &GetResponse) -> Response;

    fn write_error(&self, request_id: Uuid, error: ApiError) -> Response;
}

/// `application/json` bodies, errors in the [`ApiErrorResponse`](crate::error::ApiErrorResponse) envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseWriter;

impl ResponseWriter for JsonResponseWriter {
    fn write(&self, _request_id: Uuid, response: &GetResponse) -> Response {
        (StatusCode::OK, Json(response)).into_response()
    }

    fn write_error(&self, request_id: Uuid, error: ApiError) -> Response {
        error.into_response_for(Some(request_id))
    }
}
