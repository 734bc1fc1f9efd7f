//! Append-only transaction ledger
//!
//! Every proposal is recorded forever: executed transactions keep their
//! confirmation sets and call outcomes for audit and replay protection.

use crate::wallet::error::WalletError;
use crate::wallet::timelock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single owner confirmation on a pending transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Confirmation {
    /// Address of the confirming owner
    pub owner: String,
    /// When the confirmation was recorded
    pub confirmed_at: DateTime<Utc>,
}

/// Recorded result of the external call made at execution time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Whether the downstream call reported success
    pub success: bool,
    /// Raw return data from the callee
    pub return_data: Vec<u8>,
}

impl CallOutcome {
    /// A successful call with return data
    pub fn ok(return_data: Vec<u8>) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    /// A failed call carrying diagnostic data
    pub fn failed(return_data: Vec<u8>) -> Self {
        Self {
            success: false,
            return_data,
        }
    }
}

/// A proposed transaction awaiting confirmations
///
/// Immutable once created except for the confirmation set (pre-execution)
/// and the execution bookkeeping, which flips exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonic ledger id, assigned at submission
    pub id: u64,
    /// Call target address
    pub to: String,
    /// Amount forwarded with the call
    pub value: u64,
    /// Opaque call payload; decoded by the engine only for self-calls
    pub payload: Vec<u8>,
    /// Human-readable description for the audit trail
    pub description: String,
    /// Whether the submitter requested the emergency bypass
    pub is_emergency: bool,
    /// When the transaction was submitted
    pub submitted_at: DateTime<Utc>,
    /// Collected confirmations, in arrival order
    pub confirmations: Vec<Confirmation>,
    /// Captured the first time confirmations reach the threshold;
    /// never recomputed, even if confirmations later drop and climb back
    pub threshold_reached_at: Option<DateTime<Utc>>,
    /// True once execution has been attempted
    pub executed: bool,
    /// When execution was attempted
    pub executed_at: Option<DateTime<Utc>>,
    /// Result of the external call, recorded at execution
    pub outcome: Option<CallOutcome>,
}

impl Transaction {
    /// Create a new ledger entry with the submitter's implicit confirmation
    pub fn new(
        id: u64,
        to: String,
        value: u64,
        payload: Vec<u8>,
        description: String,
        is_emergency: bool,
        submitter: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            to,
            value,
            payload,
            description,
            is_emergency,
            submitted_at: now,
            confirmations: vec![Confirmation {
                owner: submitter.to_string(),
                confirmed_at: now,
            }],
            threshold_reached_at: None,
            executed: false,
            executed_at: None,
            outcome: None,
        }
    }

    /// Number of confirmations collected
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    /// Whether the given owner has confirmed
    pub fn is_confirmed_by(&self, address: &str) -> bool {
        self.confirmations.iter().any(|c| c.owner == address)
    }

    /// Addresses of all confirming owners, in arrival order
    pub fn confirmed_by(&self) -> Vec<&str> {
        self.confirmations.iter().map(|c| c.owner.as_str()).collect()
    }

    /// Record a confirmation
    ///
    /// # Errors
    /// Returns `AlreadyExecuted` or `AlreadyConfirmed`.
    pub fn add_confirmation(&mut self, owner: &str) -> Result<(), WalletError> {
        if self.executed {
            return Err(WalletError::AlreadyExecuted(self.id));
        }
        if self.is_confirmed_by(owner) {
            return Err(WalletError::AlreadyConfirmed(owner.to_string()));
        }
        self.confirmations.push(Confirmation {
            owner: owner.to_string(),
            confirmed_at: Utc::now(),
        });
        Ok(())
    }

    /// Withdraw a confirmation
    ///
    /// # Errors
    /// Returns `AlreadyExecuted` or `NotConfirmed`.
    pub fn remove_confirmation(&mut self, owner: &str) -> Result<(), WalletError> {
        if self.executed {
            return Err(WalletError::AlreadyExecuted(self.id));
        }
        if !self.is_confirmed_by(owner) {
            return Err(WalletError::NotConfirmed(owner.to_string()));
        }
        self.confirmations.retain(|c| c.owner != owner);
        Ok(())
    }

    /// Earliest permissible execution time, once the threshold has been met
    pub fn eligible_at(&self, time_lock_secs: u64) -> Option<DateTime<Utc>> {
        self.threshold_reached_at
            .map(|reached| timelock::eligible_at(reached, time_lock_secs, self.is_emergency))
    }
}
