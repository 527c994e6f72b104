//! Lead CRUD, filter and history endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use leadflow_core::models::lead::{CreateLead, Lead, UpdateLead};
use leadflow_core::models::modification::LeadModification;
use leadflow_core::models::user::Identity;
use serde::Deserialize;
use uuid::Uuid;

use super::envelope::ApiResponse;
use super::error::ApiError;
use crate::app::AppState;

type LeadResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn list(State(state): State<AppState>) -> LeadResult<Vec<Lead>> {
    let leads = state.leads.list().await?;
    Ok(Json(ApiResponse::ok("Leads retrieved successfully", leads)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateLead>, JsonRejection>,
) -> LeadResult<Lead> {
    let Json(input) = payload?;
    let lead = state.leads.create(input, &identity.username).await?;
    Ok(Json(ApiResponse::ok("Lead created successfully", lead)))
}

pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> LeadResult<Lead> {
    let Path(id) = id?;
    let lead = state.leads.get(id).await?;
    Ok(Json(ApiResponse::ok("Lead retrieved successfully", lead)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateLead>, JsonRejection>,
) -> LeadResult<Lead> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let lead = state.leads.update(id, input, &identity.username).await?;
    Ok(Json(ApiResponse::ok("Lead updated successfully", lead)))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
) -> LeadResult<&'static str> {
    let Path(id) = id?;
    state.leads.delete(id, &identity.username).await?;
    Ok(Json(ApiResponse::ok("Lead deleted successfully", "Lead deleted")))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

pub async fn filter_by_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> LeadResult<Vec<Lead>> {
    let Query(query) = query?;
    let leads = state.leads.by_status(&query.status).await?;
    Ok(Json(ApiResponse::ok("Leads filtered by status", leads)))
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

pub async fn filter_by_city(
    State(state): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> LeadResult<Vec<Lead>> {
    let Query(query) = query?;
    let leads = state.leads.by_city(&query.city).await?;
    Ok(Json(ApiResponse::ok("Leads filtered by city", leads)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub from_date: String,
    pub to_date: String,
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 date-time read in
/// the server's local zone.
pub(crate) fn parse_datetime(raw: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {field}: {raw}")))
}

pub async fn filter_by_date(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> LeadResult<Vec<Lead>> {
    let Query(query) = query?;
    let from = parse_datetime(&query.from_date, "fromDate")?;
    let to = parse_datetime(&query.to_date, "toDate")?;
    let leads = state.leads.by_date_range(from, to).await?;
    Ok(Json(ApiResponse::ok("Leads filtered by date", leads)))
}

pub async fn modifications(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> LeadResult<Vec<LeadModification>> {
    let Path(id) = id?;
    let history = state.leads.modification_history(id).await?;
    Ok(Json(ApiResponse::ok("Modification history retrieved", history)))
}
