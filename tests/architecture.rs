//! Architecture Verification Suite
//!
//! Keeps the shared pieces of the service usable from concurrent handlers
//! and the seams object-safe.

#[cfg(test)]
mod architecture_tests {
    use std::sync::Arc;
    use warehouse_ledger::estimator::WeightPredictor;
    use warehouse_ledger::ledger::Ledger;

    // 1. Everything handlers share must be Send + Sync
    #[test]
    fn test_shared_state_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<warehouse_ledger::ledger::InMemoryLedger>();
        assert_send_sync::<warehouse_ledger::estimator::WeightEstimator>();
        assert_send_sync::<warehouse_ledger::estimator::CommandPredictor>();
        assert_send_sync::<warehouse_ledger::server::AppState>();
        assert_send_sync::<warehouse_ledger::ServiceConfig>();
    }

    // 2. Seams stay usable as trait objects
    #[test]
    fn test_seams_are_object_safe() {
        let ledger: Arc<dyn Ledger> = Arc::new(warehouse_ledger::ledger::InMemoryLedger::default());
        assert!(ledger.is_connected());

        let predictor: Arc<dyn WeightPredictor> =
            Arc::new(warehouse_ledger::estimator::CommandPredictor::new("model", Vec::new()));
        assert_eq!(predictor.name(), "command:model");
    }

    // 3. Errors cross thread boundaries inside anyhow
    #[test]
    fn test_errors_are_portable() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}

        assert_error::<warehouse_ledger::ledger::LedgerError>();
        assert_error::<warehouse_ledger::server::ApiError>();
    }
}
