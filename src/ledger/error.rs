//! Ledger error types

use std::fmt;
use thiserror::Error;

use super::dispute::DisputeStatus;

/// Kind of record a ledger error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Measurement,
    TariffPolicy,
    Dispute,
    Block,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Measurement => "measurement",
            RecordKind::TariffPolicy => "tariff policy",
            RecordKind::Dispute => "dispute",
            RecordKind::Block => "block",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("{kind} {id} does not exist")]
    NotFound { kind: RecordKind, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: RecordKind, id: String },

    #[error("no active tariff policies")]
    NoActivePolicies,

    #[error("dispute {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: DisputeStatus,
        to: DisputeStatus,
    },

    #[error("ledger service not initialized")]
    Unavailable,
}

impl LedgerError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        LedgerError::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: RecordKind, id: impl Into<String>) -> Self {
        LedgerError::AlreadyExists { kind, id: id.into() }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
