//! Bid API endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::{parse_page, parse_uuid, require_username};
use crate::models::{Bid, BidPatch, BidStatus, NewBid};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(create_bid))
        .route("/my", get(my_bids))
        .route("/{tenderId}/list", get(bids_for_tender))
        .route("/{bidId}/edit", patch(edit_bid))
        .route("/{bidId}/status", get(bid_status).put(set_bid_status))
        .route("/{bidId}/submit_decision", put(submit_decision))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CreateBidRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "tenderId")]
    pub tender_id: Uuid,
    #[serde(rename = "organizationId")]
    pub organization_id: Uuid,
    #[serde(rename = "creatorUsername")]
    pub creator_username: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateBidRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "creatorUsername")]
    pub creator_username: String,
}

impl From<Bid> for BidResponse {
    fn from(bid: Bid) -> Self {
        Self {
            id: bid.id,
            name: bid.title,
            description: bid.description,
            status: bid.status,
            version: bid.version,
            created_at: bid.created_at,
            creator_username: bid.creator_username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BidsResponse {
    pub bids: Vec<BidResponse>,
}

impl From<Vec<Bid>> for BidsResponse {
    fn from(bids: Vec<Bid>) -> Self {
        Self {
            bids: bids.into_iter().map(BidResponse::from).collect(),
        }
    }
}

/// POST /api/bids/new
async fn create_bid(
    State(state): State<AppState>,
    Json(payload): Json<CreateBidRequest>,
) -> AppResult<Json<BidResponse>> {
    let bid = state
        .bids
        .create(NewBid {
            tender_id: payload.tender_id,
            organization_id: payload.organization_id,
            title: payload.name,
            description: payload.description,
            status: BidStatus::Created,
            creator_username: payload.creator_username,
        })
        .await?;
    Ok(Json(bid.into()))
}

#[derive(Debug, Deserialize)]
pub struct MyBidsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub username: Option<String>,
}

/// GET /api/bids/my
///
/// Bids created by `username`. An absent username matches nothing,
/// which surfaces as 404.
async fn my_bids(
    State(state): State<AppState>,
    Query(query): Query<MyBidsQuery>,
) -> AppResult<Json<BidsResponse>> {
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref())?;
    let username = query.username.unwrap_or_default();

    let bids = state.bids.list_by_creator(&username, page).await?;
    Ok(Json(bids.into()))
}

/// GET /api/bids/{tenderId}/list
///
/// The caller's bids on one tender. The `username` key must be
/// present, though it may be empty.
async fn bids_for_tender(
    State(state): State<AppState>,
    Path(tender_id): Path<String>,
    Query(query): Query<MyBidsQuery>,
) -> AppResult<Json<BidsResponse>> {
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref())?;
    let username = query
        .username
        .ok_or_else(|| AppError::bad_request("Missing username parameter"))?;
    let id = parse_uuid(&tender_id, "tenderId")?;

    let bids = state.bids.list_by_tender(id, &username, page).await?;
    Ok(Json(bids.into()))
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// PATCH /api/bids/{bidId}/edit
///
/// Creator-only partial update.
async fn edit_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<String>,
    Query(query): Query<UsernameQuery>,
    Json(payload): Json<UpdateBidRequest>,
) -> AppResult<Json<BidResponse>> {
    let id = parse_uuid(&bid_id, "bidId")?;
    let username = require_username(query.username)?;

    let patch = BidPatch {
        title: payload.name,
        description: payload.description,
    };
    let bid = state.bids.update(id, &username, patch).await?;
    Ok(Json(bid.into()))
}

/// GET /api/bids/{bidId}/status
///
/// Returns the bare status string, scoped to the creator. The
/// `username` key must be present, though it may be empty.
async fn bid_status(
    State(state): State<AppState>,
    Path(bid_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<&'static str>> {
    let id = parse_uuid(&bid_id, "bidId")?;
    let username = query
        .username
        .ok_or_else(|| AppError::bad_request("Missing username parameter"))?;

    let status = state.bids.status(id, &username).await?;
    Ok(Json(status.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusQuery {
    pub username: Option<String>,
    pub status: Option<String>,
}

/// PUT /api/bids/{bidId}/status
///
/// Creator-only status overwrite.
async fn set_bid_status(
    State(state): State<AppState>,
    Path(bid_id): Path<String>,
    Query(query): Query<SetStatusQuery>,
) -> AppResult<Json<BidResponse>> {
    let id = parse_uuid(&bid_id, "bidId")?;
    let username = require_username(query.username)?;
    let status = query
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing status parameter"))?;

    let bid = state.bids.update_status(id, &username, &status).await?;
    Ok(Json(bid.into()))
}

#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    pub username: Option<String>,
    pub decision: Option<String>,
}

/// PUT /api/bids/{bidId}/submit_decision
///
/// Records an Approved or Rejected verdict on the bid.
async fn submit_decision(
    State(state): State<AppState>,
    Path(bid_id): Path<String>,
    Query(query): Query<DecisionQuery>,
) -> AppResult<Json<BidResponse>> {
    let username = require_username(query.username)?;
    let decision = query
        .decision
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing decision parameter"))?;
    let id = parse_uuid(&bid_id, "bidId")?;

    let bid = state.bids.submit_decision(id, &username, &decision).await?;
    Ok(Json(bid.into()))
}
