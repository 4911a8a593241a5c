use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check_positive, optional_text, require_text};
use crate::ledger::{NewTariffPolicy, PolicyUnit, DEFAULT_ORGANIZATION};
use crate::server::{ApiError, ApiJson, ApiPath, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub rate: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub item_id: Option<String>,
    pub organization_id: Option<String>,
}

pub async fn create_policy(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePolicyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = require_text(req.id, "id")?;
    let name = require_text(req.name, "name")?;
    let rate = req
        .rate
        .ok_or_else(|| ApiError::validation("rate is required"))
        .and_then(|r| check_positive(r, "rate"))?;
    let unit: PolicyUnit = require_text(req.unit, "unit")?
        .parse()
        .map_err(ApiError::Validation)?;
    let category = require_text(req.category, "category")?;

    let receipt = state
        .ledger
        .create_tariff_policy(NewTariffPolicy {
            id: id.clone(),
            name,
            description: req.description.unwrap_or_default(),
            rate,
            unit,
            category,
            active: req.active.unwrap_or(true),
            created_by: optional_text(req.created_by).unwrap_or_default(),
        })
        .await?;

    info!(policy_id = %id, "Tariff policy created");

    Ok(Json(json!({
        "success": true,
        "policyId": id,
        "blockchainResult": receipt,
        "timestamp": Utc::now(),
    })))
}

pub async fn get_policy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let policy = state.ledger.get_tariff_policy(&id).await?;

    Ok(Json(json!({
        "policyId": id,
        "policy": policy,
        "timestamp": Utc::now(),
    })))
}

pub async fn calculate_tariff(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CalculateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = require_text(req.item_id, "itemId")?;
    let organization_id =
        optional_text(req.organization_id).unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());

    let calculation = state.ledger.calculate_tariff(&item_id, &organization_id).await?;

    Ok(Json(json!({
        "success": true,
        "itemId": item_id,
        "calculation": calculation,
        "timestamp": Utc::now(),
    })))
}
