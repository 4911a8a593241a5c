//! In-memory ledger
//!
//! All tables live behind one `RwLock`, so a write is visible to every
//! subsequent read and block numbers are handed out in write order.

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::chain::{self, BlockChain};
use super::dispute::{self, DisputeStatus};
use super::error::{LedgerError, LedgerResult, RecordKind};
use super::record::{
    Block, Dispute, DisputeUpdate, LedgerStats, Measurement, NetworkInfo, NewDispute,
    NewMeasurement, NewTariffPolicy, TariffCalculation, TariffPolicy, TxReceipt,
};
use super::tariff;
use super::{Ledger, LedgerConfig};

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Measurement {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for TariffPolicy {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Dispute {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Keyed rows kept in insertion order
#[derive(Debug)]
struct Table<T> {
    index: HashMap<String, usize>,
    rows: Vec<T>,
}

impl<T: Keyed> Table<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn insert(&mut self, row: T) {
        self.index.insert(row.key().to_string(), self.rows.len());
        self.rows.push(row);
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => self.rows.get_mut(i),
            None => None,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.rows.clear();
    }
}

struct LedgerState {
    measurements: Table<Measurement>,
    policies: Table<TariffPolicy>,
    disputes: Table<Dispute>,
    chain: BlockChain,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            measurements: Table::new(),
            policies: Table::new(),
            disputes: Table::new(),
            chain: BlockChain::new(),
        }
    }
}

pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    connected: AtomicBool,
    config: LedgerConfig,
}

impl InMemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        info!(
            strict_transitions = config.strict_transitions,
            simulated_latency_ms = config.simulated_latency.as_millis() as u64,
            "Initializing ledger service (stub mode)"
        );
        Self {
            state: RwLock::new(LedgerState::new()),
            connected: AtomicBool::new(true),
            config,
        }
    }

    fn ensure_connected(&self) -> LedgerResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(LedgerError::Unavailable)
        }
    }

    // Random delay in [base, 2 * base); computed before awaiting since ThreadRng is !Send.
    fn latency_sample(&self) -> Option<Duration> {
        let base = self.config.simulated_latency;
        if base.is_zero() {
            return None;
        }
        let jitter = rand::thread_rng().gen_range(0.0..1.0);
        Some(base.mul_f64(1.0 + jitter))
    }

    async fn enter(&self) -> LedgerResult<()> {
        self.ensure_connected()?;
        if let Some(delay) = self.latency_sample() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn record_measurement(&self, input: NewMeasurement) -> LedgerResult<TxReceipt> {
        self.enter().await?;
        let mut state = self.state.write().await;

        if state.measurements.contains(&input.id) {
            return Err(LedgerError::already_exists(RecordKind::Measurement, input.id));
        }

        let receipt = state.chain.commit();
        let measurement = Measurement {
            id: input.id,
            length: input.length,
            width: input.width,
            height: input.height,
            weight: input.weight,
            organization_id: input.organization_id,
            timestamp: receipt.timestamp,
            transaction_id: receipt.transaction_id.clone(),
            block_number: receipt.block_number,
        };
        info!(
            id = %measurement.id,
            block = receipt.block_number,
            tx = %receipt.transaction_id,
            "Measurement recorded on ledger"
        );
        state.measurements.insert(measurement);

        Ok(receipt)
    }

    async fn get_measurement(&self, id: &str) -> LedgerResult<Measurement> {
        self.enter().await?;
        let state = self.state.read().await;
        debug!(id, "Measurement lookup");
        state
            .measurements
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(RecordKind::Measurement, id))
    }

    async fn create_tariff_policy(&self, input: NewTariffPolicy) -> LedgerResult<TxReceipt> {
        self.enter().await?;
        let mut state = self.state.write().await;

        if state.policies.contains(&input.id) {
            return Err(LedgerError::already_exists(RecordKind::TariffPolicy, input.id));
        }

        let receipt = state.chain.commit();
        let policy = TariffPolicy {
            id: input.id,
            name: input.name,
            description: input.description,
            rate: input.rate,
            unit: input.unit,
            category: input.category,
            active: input.active,
            created_by: input.created_by,
            created_at: receipt.timestamp,
            transaction_id: receipt.transaction_id.clone(),
            block_number: receipt.block_number,
        };
        info!(
            id = %policy.id,
            unit = %policy.unit,
            rate = policy.rate,
            active = policy.active,
            block = receipt.block_number,
            "Tariff policy created"
        );
        state.policies.insert(policy);

        Ok(receipt)
    }

    async fn get_tariff_policy(&self, id: &str) -> LedgerResult<TariffPolicy> {
        self.enter().await?;
        let state = self.state.read().await;
        debug!(id, "Tariff policy lookup");
        state
            .policies
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(RecordKind::TariffPolicy, id))
    }

    async fn calculate_tariff(
        &self,
        item_id: &str,
        organization_id: &str,
    ) -> LedgerResult<TariffCalculation> {
        self.enter().await?;
        let state = self.state.read().await;

        let measurement = state
            .measurements
            .get(item_id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Measurement, item_id))?;
        let calculation = tariff::calculate(measurement, organization_id, state.policies.iter())?;

        info!(
            item_id,
            total = calculation.total_tariff,
            policies = calculation.applied_policies.len(),
            "Tariff calculated"
        );
        Ok(calculation)
    }

    async fn create_dispute(&self, input: NewDispute) -> LedgerResult<TxReceipt> {
        self.enter().await?;
        let mut state = self.state.write().await;

        if state.disputes.contains(&input.id) {
            return Err(LedgerError::already_exists(RecordKind::Dispute, input.id));
        }

        let receipt = state.chain.commit();
        let dispute = dispute::open_dispute(input, &receipt);
        info!(
            id = %dispute.id,
            item_id = %dispute.item_id,
            dispute_type = %dispute.dispute_type,
            block = receipt.block_number,
            "Dispute created"
        );
        state.disputes.insert(dispute);

        Ok(receipt)
    }

    async fn get_dispute(&self, id: &str) -> LedgerResult<Dispute> {
        self.enter().await?;
        let state = self.state.read().await;
        debug!(id, "Dispute lookup");
        state
            .disputes
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(RecordKind::Dispute, id))
    }

    async fn update_dispute_status(&self, id: &str, update: DisputeUpdate) -> LedgerResult<TxReceipt> {
        self.enter().await?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let dispute = state
            .disputes
            .get_mut(id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Dispute, id))?;
        dispute::check_transition(dispute, update.status, self.config.strict_transitions)?;

        let previous = dispute.status;
        let receipt = state.chain.commit();
        dispute::apply_update(dispute, update, &receipt);
        info!(
            id,
            from = %previous,
            to = %dispute.status,
            assigned_to = %dispute.assigned_to,
            block = receipt.block_number,
            "Dispute status updated"
        );

        Ok(receipt)
    }

    async fn get_all_disputes(&self, status: Option<DisputeStatus>) -> LedgerResult<Vec<Dispute>> {
        self.enter().await?;
        let state = self.state.read().await;
        let disputes: Vec<Dispute> = state
            .disputes
            .iter()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        debug!(count = disputes.len(), filter = ?status, "Disputes listed");
        Ok(disputes)
    }

    async fn ledger_height(&self) -> LedgerResult<u64> {
        self.enter().await?;
        Ok(self.state.read().await.chain.height())
    }

    async fn get_block(&self, number: u64) -> LedgerResult<Block> {
        self.enter().await?;
        let state = self.state.read().await;
        state
            .chain
            .block(number)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(RecordKind::Block, number.to_string()))
    }

    async fn network_info(&self) -> LedgerResult<NetworkInfo> {
        self.enter().await?;
        Ok(chain::network_info())
    }

    async fn stats(&self) -> LedgerResult<LedgerStats> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(LedgerStats {
            measurements: state.measurements.len(),
            policies: state.policies.len(),
            active_policies: state.policies.iter().filter(|p| p.active).count(),
            disputes: state.disputes.len(),
            open_disputes: state
                .disputes
                .iter()
                .filter(|d| d.status == DisputeStatus::Open)
                .count(),
            ledger_height: state.chain.height(),
        })
    }

    async fn reset(&self) -> LedgerResult<u64> {
        self.enter().await?;
        let mut state = self.state.write().await;
        state.measurements.clear();
        state.policies.clear();
        state.disputes.clear();
        state.chain.reset();
        info!("Ledger reset");
        Ok(state.chain.height())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!("Ledger service disconnected");
    }
}
