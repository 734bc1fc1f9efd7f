//! Error types for wallet operations
//!
//! Every variant is a caller-recoverable rejection of a single operation.
//! A failed operation never leaves partial state behind.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the authorization engine and owner registry
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Not an active owner: {0}")]
    Unauthorized(String),
    #[error("Emergency submission not permitted for {0}: not a registered responder")]
    EmergencyNotPermitted(String),
    #[error("Transaction not found: {0}")]
    NotFound(u64),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Already confirmed by {0}")]
    AlreadyConfirmed(String),
    #[error("No confirmation from {0} to revoke")]
    NotConfirmed(String),
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: u8 },
    #[error("Time-lock not elapsed: eligible at {eligible_at}")]
    TimeLockNotElapsed { eligible_at: DateTime<Utc> },
    #[error("Invalid threshold: {0}")]
    ThresholdViolation(String),
    #[error("Owner already active: {0}")]
    DuplicateOwner(String),
    #[error("Owner not found: {0}")]
    OwnerNotFound(String),
    #[error("Zero address is not a valid participant")]
    ZeroAddress,
    #[error("Reentrant call rejected: an execution is already in flight")]
    ReentrantCall,
    #[error("Invalid governance payload: {0}")]
    InvalidPayload(String),
}
