//! Ledger record types
//!
//! Every stored record carries the receipt of the transaction that wrote it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dispute::DisputeStatus;

/// Organization used when a caller does not name one
pub const DEFAULT_ORGANIZATION: &str = "org1";

/// Receipt handed back for every ledger write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_id: String,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// Item dimensions and weight as recorded on the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub organization_id: String,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
    pub block_number: u64,
}

impl Measurement {
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Input for recording a measurement
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub id: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub organization_id: String,
}

/// Basis on which a tariff rate is applied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PolicyUnit {
    /// Rate per unit of weight
    Weight,
    /// Rate per unit of volume (length × width × height)
    Volume,
    /// Flat rate per item
    Item,
}

impl PolicyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyUnit::Weight => "weight",
            PolicyUnit::Volume => "volume",
            PolicyUnit::Item => "item",
        }
    }
}

impl fmt::Display for PolicyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(PolicyUnit::Weight),
            "volume" => Ok(PolicyUnit::Volume),
            "item" => Ok(PolicyUnit::Item),
            other => Err(format!(
                "unknown tariff unit '{}' (expected weight, volume or item)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TariffPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rate: f64,
    pub unit: PolicyUnit,
    pub category: String,
    pub active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub transaction_id: String,
    pub block_number: u64,
}

/// Input for creating a tariff policy
#[derive(Debug, Clone, PartialEq)]
pub struct NewTariffPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rate: f64,
    pub unit: PolicyUnit,
    pub category: String,
    pub active: bool,
    pub created_by: String,
}

/// Result of a tariff calculation for one item
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TariffCalculation {
    pub item_id: String,
    pub organization_id: String,
    pub total_tariff: f64,
    pub applied_policies: Vec<TariffPolicy>,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: String,
    pub item_id: String,
    pub dispute_type: String,
    pub description: String,
    pub status: DisputeStatus,
    pub raised_by: String,
    pub assigned_to: String,
    pub resolution: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub transaction_id: String,
    pub block_number: u64,
}

/// Input for raising a dispute
#[derive(Debug, Clone, PartialEq)]
pub struct NewDispute {
    pub id: String,
    pub item_id: String,
    pub dispute_type: String,
    pub description: String,
    pub raised_by: String,
}

/// Input for a dispute status transition. Absent fields are stored empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DisputeUpdate {
    pub status: DisputeStatus,
    pub resolution: Option<String>,
    pub assigned_to: Option<String>,
}

/// A simulated block holding the transactions of one write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network_name: String,
    pub channel_name: String,
    pub organizations: Vec<String>,
    pub chaincode_name: String,
    pub chaincode_version: String,
    pub status: String,
}

/// Record counts used by the analytics endpoint
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub measurements: usize,
    pub policies: usize,
    pub active_policies: usize,
    pub disputes: usize,
    pub open_disputes: usize,
    pub ledger_height: u64,
}
