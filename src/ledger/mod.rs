//! Ledger Module
//!
//! The warehouse ledger: measurements, tariff policies and disputes recorded
//! against a simulated permissioned chain. Only an in-memory implementation
//! exists; the trait is the seam where a real network client would plug in.

pub mod chain;
pub mod dispute;
pub mod error;
pub mod memory;
pub mod record;
pub mod tariff;

pub use dispute::DisputeStatus;
pub use error::{LedgerError, LedgerResult, RecordKind};
pub use memory::InMemoryLedger;
pub use record::{
    Block, Dispute, DisputeUpdate, LedgerStats, Measurement, NetworkInfo, NewDispute,
    NewMeasurement, NewTariffPolicy, PolicyUnit, TariffCalculation, TariffPolicy, TxReceipt,
    DEFAULT_ORGANIZATION,
};

use async_trait::async_trait;
use std::time::Duration;

/// Runtime knobs of the ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerConfig {
    /// Base of the simulated network delay; every call waits between one and two times this.
    pub simulated_latency: Duration,
    /// Only accept forward dispute transitions
    pub strict_transitions: bool,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn record_measurement(&self, input: NewMeasurement) -> LedgerResult<TxReceipt>;

    async fn get_measurement(&self, id: &str) -> LedgerResult<Measurement>;

    async fn create_tariff_policy(&self, input: NewTariffPolicy) -> LedgerResult<TxReceipt>;

    async fn get_tariff_policy(&self, id: &str) -> LedgerResult<TariffPolicy>;

    /// Sum the charges of all active policies for a recorded item
    async fn calculate_tariff(
        &self,
        item_id: &str,
        organization_id: &str,
    ) -> LedgerResult<TariffCalculation>;

    async fn create_dispute(&self, input: NewDispute) -> LedgerResult<TxReceipt>;

    async fn get_dispute(&self, id: &str) -> LedgerResult<Dispute>;

    async fn update_dispute_status(&self, id: &str, update: DisputeUpdate) -> LedgerResult<TxReceipt>;

    /// All disputes in insertion order, optionally restricted to one status
    async fn get_all_disputes(&self, status: Option<DisputeStatus>) -> LedgerResult<Vec<Dispute>>;

    async fn ledger_height(&self) -> LedgerResult<u64>;

    async fn get_block(&self, number: u64) -> LedgerResult<Block>;

    async fn network_info(&self) -> LedgerResult<NetworkInfo>;

    async fn stats(&self) -> LedgerResult<LedgerStats>;

    /// Drop every record and rewind the chain. Returns the new height.
    async fn reset(&self) -> LedgerResult<u64>;

    fn is_connected(&self) -> bool;

    fn disconnect(&self);
}
