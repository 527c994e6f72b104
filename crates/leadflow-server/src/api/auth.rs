//! Login and password-reset endpoints.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use leadflow_auth::{LoginInput, ResetPasswordInput};
use leadflow_core::models::user::Role;
use serde::{Deserialize, Serialize};

use super::envelope::ApiResponse;
use super::error::ApiError;
use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub expires_in: u64,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(req) = payload?;
    let output = state
        .auth
        .login(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token: output.token,
            username: output.username,
            role: output.role,
            expires_in: output.expires_in,
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub otp_sent_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ForgotPasswordResponse>>, ApiError> {
    let Json(req) = payload?;
    let ticket = state.reset.request_reset(&req.username, &req.email).await?;

    let message = format!("OTP generated and sent to: {}", ticket.masked_email);
    let otp = state.expose_reset_code.then_some(ticket.code);
    Ok(Json(ApiResponse::ok(
        message,
        ForgotPasswordResponse {
            otp_sent_to: ticket.masked_email,
            otp,
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub username: String,
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    let Json(req) = payload?;
    state.reset.verify_otp(&req.username, &req.otp)?;
    Ok(Json(ApiResponse::ok("OTP verified successfully", "OTP verified")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub username: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    let Json(req) = payload?;
    state
        .reset
        .reset_password(ResetPasswordInput {
            username: req.username,
            new_password: req.new_password,
            confirm_password: req.confirm_password,
        })
        .await?;
    Ok(Json(ApiResponse::ok(
        "Password reset successfully",
        "Password updated",
    )))
}
