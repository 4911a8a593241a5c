//! Warehouse ERP ledger backend
//!
//! Loads configuration from the environment (and `.env`), wires the ledger
//! and weight estimator together and serves the HTTP API until Ctrl-C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use warehouse_ledger::estimator::{CommandPredictor, WeightEstimator};
use warehouse_ledger::ledger::{InMemoryLedger, Ledger};
use warehouse_ledger::server::{run_server, AppState};
use warehouse_ledger::utils::init_telemetry;
use warehouse_ledger::ServiceConfig;

fn build_estimator(config: &ServiceConfig) -> WeightEstimator {
    match config.model_command.as_deref() {
        Some(command) => match CommandPredictor::from_command_line(command) {
            Some(predictor) => {
                let predictor = predictor.with_timeout(config.model_timeout);
                info!("Weight model command configured: {}", command);
                WeightEstimator::with_predictor(Arc::new(predictor))
            }
            None => {
                warn!("WAREHOUSE_MODEL_COMMAND is blank; using fallback weight formula");
                WeightEstimator::fallback_only()
            }
        },
        None => {
            info!("No weight model configured; using fallback weight formula");
            WeightEstimator::fallback_only()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServiceConfig::from_env();
    let _telemetry = init_telemetry(config.log_dir.as_deref())?;

    let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new(config.ledger.clone()));
    let estimator = build_estimator(&config);

    let state = AppState::new(ledger, estimator, config);
    run_server(state).await
}
