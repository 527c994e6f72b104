//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod leads;
pub mod upload;

use axum::body::{Bytes, HttpBody};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};

use error::ApiError;

const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Uploaded file exceeds the maximum allowed size";

/// Liveness check.
pub async fn health() -> Json<envelope::ApiResponse<()>> {
    Json(envelope::ApiResponse::message("ok"))
}

/// Fallback for paths no route matches.
pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Resource not found")
}

/// Rewrites the plain-text rejection of the body limit into the envelope.
pub async fn envelope_payload_too_large<B>(response: axum::http::Response<B>) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE)
            .into_response();
    }
    response.into_response()
}
