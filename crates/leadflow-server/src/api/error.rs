//! Mapping of domain errors onto HTTP responses.
//!
//! Internal failures are logged in full and answered with a generic
//! message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadflow_core::error::LeadflowError;

use super::envelope::ApiResponse;

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

impl From<LeadflowError> for ApiError {
    fn from(err: LeadflowError) -> Self {
        let status = match &err {
            LeadflowError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            LeadflowError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            LeadflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeadflowError::AlreadyExists { .. } => StatusCode::CONFLICT,
            LeadflowError::Validation { .. } => StatusCode::BAD_REQUEST,
            LeadflowError::Database(_) | LeadflowError::Crypto(_) | LeadflowError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if err.is_internal() {
            tracing::error!(error = %err, "request failed");
            return Self {
                status,
                message: INTERNAL_MESSAGE.into(),
            };
        }

        let message = match err {
            LeadflowError::AuthenticationFailed { reason } => reason,
            LeadflowError::AuthorizationDenied { .. } => "Access denied".into(),
            LeadflowError::NotFound { entity, .. } => format!("{} not found", capitalize(&entity)),
            LeadflowError::AlreadyExists { entity } => {
                format!("{} with the same unique fields already exists", capitalize(&entity))
            }
            LeadflowError::Validation { message } => message,
            other => other.to_string(),
        };
        Self { status, message }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (
                LeadflowError::AuthenticationFailed {
                    reason: "invalid credentials".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                LeadflowError::AuthorizationDenied {
                    reason: "nope".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (LeadflowError::not_found("lead", "42"), StatusCode::NOT_FOUND),
            (
                LeadflowError::AlreadyExists {
                    entity: "lead".into(),
                },
                StatusCode::CONFLICT,
            ),
            (LeadflowError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                LeadflowError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let api = ApiError::from(LeadflowError::Database("connection refused at 10.0.0.7".into()));
        assert_eq!(api.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn not_found_names_the_entity() {
        let api = ApiError::from(LeadflowError::not_found("lead", "42"));
        assert_eq!(api.message, "Lead not found");
    }
}
