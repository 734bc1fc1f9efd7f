//! Observable wallet events
//!
//! Audit trail consumed by dashboards and monitoring; never read back
//! for internal state decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event recorded in a wallet's journal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WalletEvent {
    TransactionSubmitted {
        tx_id: u64,
        submitter: String,
        at: DateTime<Utc>,
    },
    TransactionConfirmed {
        tx_id: u64,
        owner: String,
        at: DateTime<Utc>,
    },
    TransactionRevoked {
        tx_id: u64,
        owner: String,
        at: DateTime<Utc>,
    },
    TransactionExecuted {
        tx_id: u64,
        at: DateTime<Utc>,
    },
    OwnerAdded {
        address: String,
        at: DateTime<Utc>,
    },
    OwnerRemoved {
        address: String,
        at: DateTime<Utc>,
    },
}

impl WalletEvent {
    /// Short label for display and filtering
    pub fn label(&self) -> &'static str {
        match self {
            WalletEvent::TransactionSubmitted { .. } => "submitted",
            WalletEvent::TransactionConfirmed { .. } => "confirmed",
            WalletEvent::TransactionRevoked { .. } => "revoked",
            WalletEvent::TransactionExecuted { .. } => "executed",
            WalletEvent::OwnerAdded { .. } => "owner_added",
            WalletEvent::OwnerRemoved { .. } => "owner_removed",
        }
    }
}
