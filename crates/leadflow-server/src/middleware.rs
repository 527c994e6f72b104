//! Access gate applied to every route.
//!
//! Resolves the bearer token (if any) to an [`Identity`], checks the
//! path against the access rules and attaches the identity as a
//! request extension for the handlers.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use leadflow_auth::{Access, authorize, required_access};
use leadflow_core::models::user::Identity;

use crate::api::error::ApiError;
use crate::app::AppState;

fn extract_bearer(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

pub async fn access_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let public = matches!(required_access(&path), Access::Public);

    let identity = match extract_bearer(&req) {
        Some(token) => match state.auth.authenticate(&token).await {
            Ok(identity) => Some(identity),
            Err(err) if public => {
                tracing::debug!(error = %err, "ignoring invalid token on public route");
                None
            }
            Err(err) => return ApiError::from(err).into_response(),
        },
        None => None,
    };

    if let Err(err) = authorize(&path, identity.as_ref()) {
        tracing::debug!(%path, error = %err, "request rejected by access gate");
        return ApiError::from(err).into_response();
    }

    if let Some(identity) = identity {
        req.extensions_mut().insert::<Identity>(identity);
    }
    next.run(req).await
}
