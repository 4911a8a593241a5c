//! Analytics, batch estimation, health and chain inspection endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::items::source_label;
use super::{check_features, check_positive, optional_text, require_positive};
use crate::estimator::{WeightFeatures, DEFAULT_DENSITY_FACTOR};
use crate::server::{ApiError, ApiJson, ApiPath, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeItem {
    pub id: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub density_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub items: Option<Vec<OptimizeItem>>,
}

pub async fn analytics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.ledger.stats().await?;
    let network = state.ledger.network_info().await?;
    let estimator = state.estimator.status();

    Ok(Json(json!({
        "totalItems": stats.measurements,
        "totalPolicies": stats.policies,
        "activePolicies": stats.active_policies,
        "totalDisputes": stats.disputes,
        "openDisputes": stats.open_disputes,
        "ledgerHeight": stats.ledger_height,
        "blockchainStatus": "connected",
        "blockchainNetwork": network.network_name,
        "estimator": estimator,
        "timestamp": Utc::now(),
    })))
}

pub async fn optimize(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OptimizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = match req.items {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(ApiError::validation(
                "items array is required and cannot be empty",
            ))
        }
    };

    // Validate the whole batch before estimating anything
    let mut batch = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let features = WeightFeatures::new(
            require_positive(item.length, "length")?,
            require_positive(item.width, "width")?,
            require_positive(item.height, "height")?,
            item.density_factor
                .map(|d| check_positive(d, "densityFactor"))
                .transpose()?
                .unwrap_or(state.config.default_density),
        );
        check_features(&features)?;
        let item_id = optional_text(item.id).unwrap_or_else(|| format!("item_{}", index + 1));
        batch.push((item_id, item.weight, features));
    }

    let mut results = Vec::with_capacity(batch.len());
    for (item_id, original_weight, features) in batch {
        let estimate = state.estimator.estimate(&features).await;
        results.push(json!({
            "itemId": item_id,
            "originalWeight": original_weight,
            "predictedWeight": estimate.weight,
            "weightSource": source_label(estimate.source),
            "dimensions": {
                "length": features.length,
                "width": features.width,
                "height": features.height,
            },
            "densityFactor": features.density_factor,
        }));
    }

    info!("Optimization completed for {} items", results.len());

    Ok(Json(json!({
        "success": true,
        "totalItems": results.len(),
        "optimizationResults": results,
        "timestamp": Utc::now(),
    })))
}

/// Per-dependency health. Answers 503 when anything is unhealthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let blockchain = match state.ledger.ledger_height().await {
        Ok(height) => json!({ "status": "healthy", "ledgerHeight": height }),
        Err(e) => {
            warn!("Ledger health check failed: {}", e);
            json!({ "status": "unhealthy", "error": e.to_string() })
        }
    };

    let probe = WeightFeatures::new(10.0, 10.0, 10.0, DEFAULT_DENSITY_FACTOR);
    let estimate = state.estimator.estimate(&probe).await;
    let ml_model = json!({
        "status": "healthy",
        "mode": state.estimator.status().mode,
        "lastPrediction": estimate.weight,
        "weightSource": source_label(estimate.source),
    });

    let degraded = [&blockchain, &ml_model]
        .iter()
        .any(|component| component["status"] == "unhealthy");
    let (code, overall) = if degraded {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        code,
        Json(json!({
            "blockchain": blockchain,
            "ml_model": ml_model,
            "overall": { "status": overall },
            "timestamp": Utc::now(),
        })),
    )
}

pub async fn ledger_height(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let height = state.ledger.ledger_height().await?;
    Ok(Json(json!({ "height": height, "timestamp": Utc::now() })))
}

pub async fn get_block(
    State(state): State<AppState>,
    ApiPath(number): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let number: u64 = number
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid block number '{}'", number)))?;
    let block = state.ledger.get_block(number).await?;
    Ok(Json(block))
}

pub async fn network_info(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let info = state.ledger.network_info().await?;
    Ok(Json(info))
}

pub async fn reset_ledger(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let height = state.ledger.reset().await?;
    Ok(Json(json!({
        "message": "Ledger reset",
        "newHeight": height,
    })))
}
