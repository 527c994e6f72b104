//! Spreadsheet upload endpoint.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartRejection;
use leadflow_leads::ImportReport;

use super::envelope::ApiResponse;
use super::error::ApiError;
use crate::app::AppState;

const FILE_FIELD: &str = "file";

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            bytes = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::bad_request("Please select a file to upload"))?;

    let report = state.importer.import_bytes(bytes.to_vec()).await;
    Ok(Json(ApiResponse {
        success: report.success,
        message: report.message.clone(),
        data: Some(report),
    }))
}
