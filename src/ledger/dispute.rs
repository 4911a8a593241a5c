//! Dispute lifecycle
//!
//! `open → investigating → resolved → closed`. Transitions are permissive unless
//! the ledger runs with strict transitions, in which case only forward moves
//! along the lifecycle are accepted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{LedgerError, LedgerResult};
use super::record::{Dispute, DisputeUpdate, NewDispute, TxReceipt};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl DisputeStatus {
    pub const ALL: [DisputeStatus; 4] = [
        DisputeStatus::Open,
        DisputeStatus::Investigating,
        DisputeStatus::Resolved,
        DisputeStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::Investigating => "investigating",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Closed => "closed",
        }
    }

    /// Terminal by convention only; nothing stops a permissive ledger from reopening.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisputeStatus::Resolved | DisputeStatus::Closed)
    }

    /// Forward-only transition table used in strict mode
    pub fn can_transition_to(&self, next: DisputeStatus) -> bool {
        use DisputeStatus::*;
        matches!(
            (self, next),
            (Open, Investigating)
                | (Open, Resolved)
                | (Open, Closed)
                | (Investigating, Resolved)
                | (Investigating, Closed)
                | (Resolved, Closed)
        )
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisputeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisputeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown dispute status '{}' (expected open, investigating, resolved or closed)",
                    s
                )
            })
    }
}

/// Build a freshly raised dispute. The status is always `open`.
pub fn open_dispute(input: NewDispute, receipt: &TxReceipt) -> Dispute {
    Dispute {
        id: input.id,
        item_id: input.item_id,
        dispute_type: input.dispute_type,
        description: input.description,
        status: DisputeStatus::Open,
        raised_by: input.raised_by,
        assigned_to: String::new(),
        resolution: String::new(),
        created_at: receipt.timestamp,
        updated_at: receipt.timestamp,
        transaction_id: receipt.transaction_id.clone(),
        block_number: receipt.block_number,
    }
}

/// Check a transition without touching the dispute
pub fn check_transition(dispute: &Dispute, next: DisputeStatus, strict: bool) -> LedgerResult<()> {
    if strict && !dispute.status.can_transition_to(next) {
        return Err(LedgerError::InvalidTransition {
            id: dispute.id.clone(),
            from: dispute.status,
            to: next,
        });
    }
    Ok(())
}

/// Overwrite status, resolution and assignee and refresh `updated_at`
pub fn apply_update(dispute: &mut Dispute, update: DisputeUpdate, receipt: &TxReceipt) {
    dispute.status = update.status;
    dispute.resolution = update.resolution.unwrap_or_default();
    dispute.assigned_to = update.assigned_to.unwrap_or_default();
    dispute.updated_at = advance(dispute.updated_at, receipt.timestamp);
    dispute.transaction_id = receipt.transaction_id.clone();
    dispute.block_number = receipt.block_number;
}

// updated_at must move strictly forward even when the clock has not ticked.
fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
