use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check_features, check_positive, optional_text, require_positive, require_text};
use crate::estimator::{WeightFeatures, WeightSource};
use crate::ledger::{NewMeasurement, DEFAULT_ORGANIZATION};
use crate::server::{ApiError, ApiJson, ApiPath, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordItemRequest {
    pub id: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Predicted when absent
    pub weight: Option<f64>,
    pub density_factor: Option<f64>,
    pub organization_id: Option<String>,
}

pub async fn record_item(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecordItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = require_text(req.id, "id")?;
    let length = require_positive(req.length, "length")?;
    let width = require_positive(req.width, "width")?;
    let height = require_positive(req.height, "height")?;
    // A zero weight means "not weighed"
    let weight = req
        .weight
        .filter(|&w| w != 0.0)
        .map(|w| check_positive(w, "weight"))
        .transpose()?;
    let density_factor = req
        .density_factor
        .map(|d| check_positive(d, "densityFactor"))
        .transpose()?
        .unwrap_or(state.config.default_density);
    let organization_id =
        optional_text(req.organization_id).unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());

    let features = WeightFeatures::new(length, width, height, density_factor);
    check_features(&features)?;

    let (weight, source) = match weight {
        Some(w) => (w, None),
        None => {
            let estimate = state.estimator.estimate(&features).await;
            (estimate.weight, Some(estimate.source))
        }
    };

    let receipt = state
        .ledger
        .record_measurement(NewMeasurement {
            id: id.clone(),
            length,
            width,
            height,
            weight,
            organization_id: organization_id.clone(),
        })
        .await?;

    info!(
        item_id = %id,
        length,
        width,
        height,
        weight,
        organization_id = %organization_id,
        predicted = source.is_some(),
        "Item recorded"
    );

    Ok(Json(json!({
        "success": true,
        "itemId": id,
        "predictedWeight": weight,
        "weightSource": source.map(source_label).unwrap_or("provided"),
        "organizationId": organization_id,
        "blockchainResult": receipt,
        "timestamp": Utc::now(),
    })))
}

pub async fn get_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let measurement = state.ledger.get_measurement(&id).await?;

    Ok(Json(json!({
        "itemId": id,
        "measurements": measurement,
        "timestamp": Utc::now(),
    })))
}

pub(crate) fn source_label(source: WeightSource) -> &'static str {
    match source {
        WeightSource::Model => "model",
        WeightSource::Fallback => "fallback",
    }
}
