use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{optional_text, require_text};
use crate::ledger::{DisputeStatus, DisputeUpdate, NewDispute};
use crate::server::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisputeRequest {
    pub id: Option<String>,
    pub item_id: Option<String>,
    pub dispute_type: Option<String>,
    pub description: Option<String>,
    pub raised_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisputeFilter {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<DisputeStatus, ApiError> {
    raw.trim().parse().map_err(ApiError::Validation)
}

pub async fn create_dispute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateDisputeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewDispute {
        id: require_text(req.id, "id")?,
        item_id: require_text(req.item_id, "itemId")?,
        dispute_type: require_text(req.dispute_type, "disputeType")?,
        description: require_text(req.description, "description")?,
        raised_by: require_text(req.raised_by, "raisedBy")?,
    };
    let id = input.id.clone();

    let receipt = state.ledger.create_dispute(input).await?;
    info!(dispute_id = %id, "Dispute created");

    Ok(Json(json!({
        "success": true,
        "disputeId": id,
        "blockchainResult": receipt,
        "timestamp": Utc::now(),
    })))
}

pub async fn get_dispute(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let dispute = state.ledger.get_dispute(&id).await?;

    Ok(Json(json!({
        "disputeId": id,
        "dispute": dispute,
        "timestamp": Utc::now(),
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = parse_status(&require_text(req.status, "status")?)?;

    let update = DisputeUpdate {
        status,
        resolution: req.resolution,
        assigned_to: req.assigned_to,
    };
    let receipt = state.ledger.update_dispute_status(&id, update).await?;
    info!(dispute_id = %id, status = %status, "Dispute status updated");

    Ok(Json(json!({
        "success": true,
        "disputeId": id,
        "blockchainResult": receipt,
        "timestamp": Utc::now(),
    })))
}

pub async fn list_disputes(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<DisputeFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let status = optional_text(filter.status)
        .map(|s| parse_status(&s))
        .transpose()?;

    let disputes = state.ledger.get_all_disputes(status).await?;

    Ok(Json(json!({
        "success": true,
        "count": disputes.len(),
        "disputes": disputes,
        "timestamp": Utc::now(),
    })))
}
