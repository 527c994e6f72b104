//! Per-lead chat endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use leadflow_core::models::chat::ChatMessage;
use leadflow_core::models::user::Identity;
use serde::Deserialize;
use uuid::Uuid;

use super::envelope::ApiResponse;
use super::error::ApiError;
use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

pub async fn send(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    lead_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    let Path(lead_id) = lead_id?;
    let Json(req) = payload?;
    let message = state
        .chat
        .send(lead_id, &identity.username, &req.message)
        .await?;
    Ok(Json(ApiResponse::ok("Message sent successfully", message)))
}

pub async fn history(
    State(state): State<AppState>,
    lead_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let Path(lead_id) = lead_id?;
    let messages = state.chat.history(lead_id).await?;
    Ok(Json(ApiResponse::ok(
        "Chat history retrieved successfully",
        messages,
    )))
}
