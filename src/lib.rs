//! Warehouse ERP ledger backend
//!
//! An HTTP service that records item measurements, tariff policies and
//! disputes on a simulated permissioned ledger, with:
//! - Weight prediction through an external model command, falling back to a formula
//! - Tariff calculation over all active policies
//! - Dispute lifecycle tracking
//! - Structured logging to console and rolling files

pub mod config;
pub mod estimator;
pub mod ledger;
pub mod server;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use estimator::{CommandPredictor, WeightEstimator, WeightPredictor};
pub use ledger::{InMemoryLedger, Ledger, LedgerConfig, LedgerError};
pub use server::{router, run_server, ApiError, AppState};
