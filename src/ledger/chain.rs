//! Simulated chain: block numbers, transaction ids and network metadata.
//!
//! Nothing here is cryptographic. Each write gets its own block so receipts
//! carry strictly increasing block numbers.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;

use super::record::{Block, NetworkInfo, TxReceipt};

/// Height of an empty ledger
pub const GENESIS_HEIGHT: u64 = 1000;

const TX_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `tx_<unix millis>_<9 base36 chars>`
pub fn new_transaction_id(at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TX_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("tx_{}_{}", at.timestamp_millis(), suffix)
}

#[derive(Debug, Clone)]
pub struct BlockChain {
    next_block: u64,
    blocks: BTreeMap<u64, Block>,
}

impl BlockChain {
    pub fn new() -> Self {
        Self {
            next_block: GENESIS_HEIGHT,
            blocks: BTreeMap::new(),
        }
    }

    /// Seal a single-transaction block and return its receipt
    pub fn commit(&mut self) -> TxReceipt {
        let timestamp = Utc::now();
        let transaction_id = new_transaction_id(timestamp);
        let number = self.next_block;

        self.blocks.insert(
            number,
            Block {
                number,
                timestamp,
                transactions: vec![transaction_id.clone()],
            },
        );
        self.next_block += 1;

        TxReceipt {
            transaction_id,
            block_number: number,
            timestamp,
        }
    }

    /// Number the next block will receive
    pub fn height(&self) -> u64 {
        self.next_block
    }

    pub fn block(&self, number: u64) -> Option<&Block> {
        self.blocks.get(&number)
    }

    pub fn reset(&mut self) {
        self.next_block = GENESIS_HEIGHT;
        self.blocks.clear();
    }
}

impl Default for BlockChain {
    fn default() -> Self {
        Self::new()
    }
}

pub fn network_info() -> NetworkInfo {
    NetworkInfo {
        network_name: "warehouse-network".to_string(),
        channel_name: "warehouse-channel".to_string(),
        organizations: vec!["org1".to_string(), "org2".to_string()],
        chaincode_name: "warehouse-contract".to_string(),
        chaincode_version: "1.0.0".to_string(),
        status: "running".to_string(),
    }
}
