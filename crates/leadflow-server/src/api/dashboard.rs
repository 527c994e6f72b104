//! Funnel statistics endpoint.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use leadflow_leads::DashboardStats;
use serde::Deserialize;

use super::envelope::ApiResponse;
use super::error::ApiError;
use super::leads::parse_datetime;
use crate::app::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

pub async fn stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let Query(query) = query?;
    let from = query
        .from_date
        .as_deref()
        .map(|raw| parse_datetime(raw, "fromDate"))
        .transpose()?;
    let to = query
        .to_date
        .as_deref()
        .map(|raw| parse_datetime(raw, "toDate"))
        .transpose()?;

    let stats = state.dashboard.compute_stats(from, to).await?;
    Ok(Json(ApiResponse::ok(
        "Dashboard stats retrieved successfully",
        stats,
    )))
}
