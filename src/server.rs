use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, OriginalUri,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::estimator::WeightEstimator;
use crate::ledger::{Ledger, LedgerError};
use crate::services::{disputes, items, operations, tariffs};

pub const SERVICE_NAME: &str = "warehouse-ledger";

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request data; raised before any store is touched
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(e) => match e {
                LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                LedgerError::AlreadyExists { .. } | LedgerError::InvalidTransition { .. } => {
                    StatusCode::CONFLICT
                }
                LedgerError::NoActivePolicies => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match &self {
            ApiError::Validation(msg) => ("Invalid request", msg.clone()),
            ApiError::Ledger(LedgerError::NotFound { .. }) => ("Not found", self.to_string()),
            ApiError::Ledger(LedgerError::NoActivePolicies) => ("No active policies", self.to_string()),
            ApiError::Ledger(LedgerError::Unavailable) => (
                "Service unavailable",
                "Ledger or estimator services not initialized".to_string(),
            ),
            ApiError::Ledger(_) => ("Conflict", self.to_string()),
            ApiError::Internal(e) => {
                error!("Unhandled error: {:#}", e);
                ("Internal server error", "Something went wrong".to_string())
            }
        };
        (status, Json(json!({ "error": title, "message": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections come back as [`ApiError`] bodies
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub estimator: Arc<WeightEstimator>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>, estimator: WeightEstimator, config: ServiceConfig) -> Self {
        Self {
            ledger,
            estimator: Arc::new(estimator),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut warehouse = Router::new()
        .route("/items", post(items::record_item))
        .route("/items/{id}", get(items::get_item))
        .route("/tariffs", post(tariffs::create_policy))
        .route("/tariffs/calculate", post(tariffs::calculate_tariff))
        .route("/tariffs/{id}", get(tariffs::get_policy))
        .route("/disputes", post(disputes::create_dispute).get(disputes::list_disputes))
        .route("/disputes/{id}", get(disputes::get_dispute))
        .route("/disputes/{id}/status", put(disputes::update_status))
        .route("/analytics", get(operations::analytics))
        .route("/optimize", post(operations::optimize))
        .route("/health", get(operations::health))
        .route("/ledger/height", get(operations::ledger_height))
        .route("/ledger/blocks/{number}", get(operations::get_block))
        .route("/network", get(operations::network_info));

    if state.config.allow_reset {
        warehouse = warehouse.route("/admin/reset", post(operations::reset_ledger));
    }

    Router::new()
        .route("/health", get(liveness))
        .nest("/api/warehouse", warehouse)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr();
    let ledger = state.ledger.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ERP backend running on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ledger.disconnect();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn liveness() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "service": SERVICE_NAME,
    }))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": format!("Route {} not found", uri.path()),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let (status, body) = render(ApiError::from(anyhow!("database exploded"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "Something went wrong");
        assert!(!body.to_string().contains("exploded"));
    }

    #[tokio::test]
    async fn test_ledger_errors_map_to_statuses() {
        let cases = [
            (LedgerError::not_found(crate::ledger::RecordKind::Dispute, "d"), StatusCode::NOT_FOUND),
            (LedgerError::already_exists(crate::ledger::RecordKind::Dispute, "d"), StatusCode::CONFLICT),
            (LedgerError::NoActivePolicies, StatusCode::UNPROCESSABLE_ENTITY),
            (LedgerError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            let (status, body) = render(ApiError::from(err)).await;
            assert_eq!(status, expected);
            assert!(body["message"].is_string());
        }
    }
}
