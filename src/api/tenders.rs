//! Tender API endpoints
//!
//! Wire DTOs keep the published field names (`name` for the title,
//! camelCase identifiers, snake_case timestamps), which is why the
//! renames are spelled per field.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::{parse_page, parse_uuid, require_username};
use crate::models::{NewTender, Tender, TenderPatch, TenderStatus};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tenders))
        .route("/new", post(create_tender))
        .route("/my", get(my_tenders))
        .route("/{tenderId}/edit", patch(edit_tender))
        .route("/{tenderId}/status", get(tender_status).put(set_tender_status))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CreateTenderRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "organizationId")]
    pub organization_id: Uuid,
    #[serde(rename = "creatorUsername")]
    pub creator_username: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateTenderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TenderResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    pub status: TenderStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Tender> for TenderResponse {
    fn from(tender: Tender) -> Self {
        Self {
            id: tender.id,
            name: tender.title,
            description: tender.description,
            service_type: tender.service_type,
            status: tender.status,
            version: tender.version,
            created_at: tender.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TendersResponse {
    pub tenders: Vec<TenderResponse>,
}

impl From<Vec<Tender>> for TendersResponse {
    fn from(tenders: Vec<Tender>) -> Self {
        Self {
            tenders: tenders.into_iter().map(TenderResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTendersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Comma-separated service type filter.
    #[serde(rename = "serviceTypes")]
    pub service_types: Option<String>,
}

/// GET /api/tenders
///
/// Public listing, newest first.
async fn list_tenders(
    State(state): State<AppState>,
    Query(query): Query<ListTendersQuery>,
) -> AppResult<Json<TendersResponse>> {
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref())?;
    let service_types: Vec<String> = query
        .service_types
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let tenders = state.tenders.list(&service_types, page).await?;
    Ok(Json(tenders.into()))
}

/// POST /api/tenders/new
async fn create_tender(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenderRequest>,
) -> AppResult<Json<TenderResponse>> {
    let tender = state
        .tenders
        .create(NewTender {
            organization_id: payload.organization_id,
            title: payload.name,
            description: payload.description,
            service_type: payload.service_type,
            status: TenderStatus::Created,
            creator_username: payload.creator_username,
        })
        .await?;
    Ok(Json(tender.into()))
}

#[derive(Debug, Deserialize)]
pub struct MyTendersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub username: Option<String>,
}

/// GET /api/tenders/my
///
/// Tenders created by `username`. An absent username matches nothing,
/// which surfaces as 404.
async fn my_tenders(
    State(state): State<AppState>,
    Query(query): Query<MyTendersQuery>,
) -> AppResult<Json<TendersResponse>> {
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref())?;
    let username = query.username.unwrap_or_default();

    let tenders = state.tenders.list_by_creator(&username, page).await?;
    Ok(Json(tenders.into()))
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// PATCH /api/tenders/{tenderId}/edit
///
/// Creator-only partial update.
async fn edit_tender(
    State(state): State<AppState>,
    Path(tender_id): Path<String>,
    Query(query): Query<UsernameQuery>,
    Json(payload): Json<UpdateTenderRequest>,
) -> AppResult<Json<TenderResponse>> {
    let username = require_username(query.username)?;
    let id = parse_uuid(&tender_id, "tenderId")?;

    let patch = TenderPatch {
        title: payload.name,
        description: payload.description,
        status: payload.status,
    };
    let tender = state.tenders.update(id, &username, patch).await?;
    Ok(Json(tender.into()))
}

/// GET /api/tenders/{tenderId}/status
///
/// Returns the bare status string.
async fn tender_status(
    State(state): State<AppState>,
    Path(tender_id): Path<String>,
) -> AppResult<Json<&'static str>> {
    let id = parse_uuid(&tender_id, "tenderId")?;
    let status = state.tenders.status(id).await?;
    Ok(Json(status.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusQuery {
    pub username: Option<String>,
    pub status: Option<String>,
}

/// PUT /api/tenders/{tenderId}/status
///
/// Creator-only status overwrite.
async fn set_tender_status(
    State(state): State<AppState>,
    Path(tender_id): Path<String>,
    Query(query): Query<SetStatusQuery>,
) -> AppResult<Json<TenderResponse>> {
    let username = require_username(query.username)?;
    let id = parse_uuid(&tender_id, "tenderId")?;
    let status = query
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing status parameter"))?;

    let tender = state.tenders.update_status(id, &username, &status).await?;
    Ok(Json(tender.into()))
}
