//! Threshold authorization engine
//!
//! Orchestrates the propose → confirm → (wait) → execute lifecycle of a
//! single wallet instance. The engine is the only component that mutates
//! the owner registry (via self-targeted governance transactions) and the
//! only place external calls are triggered.
//!
//! Execution is strictly serialized per wallet: every operation completes
//! or fails atomically, and a reentrancy flag rejects nested calls made
//! while an external payload is being dispatched.

use crate::wallet::error::WalletError;
use crate::wallet::events::WalletEvent;
use crate::wallet::governance::GovernanceOp;
use crate::wallet::owner::{validate_address, Owner, OwnerRegistry, OwnerSpec};
use crate::wallet::timelock;
use crate::wallet::transaction::{CallOutcome, Transaction};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Boundary for the arbitrary external call made when a transaction
/// executes
///
/// Collaborators (licensing registry, payment pass-through) implement
/// this; the engine only knows the call signature, never their logic.
pub trait CallTarget {
    /// Perform the downstream call and report its outcome
    fn call(&mut self, to: &str, value: u64, payload: &[u8]) -> CallOutcome;
}

/// A threshold multi-signature wallet instance
///
/// Owns its signer registry, its append-only transaction ledger, and its
/// event journal. Configuration (owners, threshold) changes only through
/// successfully executed self-targeted transactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorizationWallet {
    /// This wallet's address; self-targeted transactions are decoded as
    /// governance payloads
    address: String,
    owners: OwnerRegistry,
    /// Minimum distinct confirmations required to execute
    threshold: u8,
    /// Mandatory delay between threshold satisfaction and execution
    time_lock_secs: u64,
    /// Owners permitted to submit transactions that bypass the time-lock
    emergency_responders: Vec<String>,
    /// Append-only; transaction id is the ledger position
    ledger: Vec<Transaction>,
    events: Vec<WalletEvent>,
    /// Set for the duration of payload dispatch
    #[serde(skip)]
    executing: bool,
}

impl AuthorizationWallet {
    /// Create a wallet instance
    ///
    /// # Errors
    /// Rejects blank addresses, duplicate founders, a threshold of zero
    /// or above the owner count, and responders outside the owner set.
    pub fn new(
        address: impl Into<String>,
        founders: &[OwnerSpec],
        threshold: u8,
        time_lock_secs: u64,
        emergency_responders: Vec<String>,
    ) -> Result<Self, WalletError> {
        let address = address.into();
        validate_address(&address)?;

        let owners = OwnerRegistry::new(founders)?;
        if threshold == 0 {
            return Err(WalletError::ThresholdViolation(
                "threshold must be at least 1".to_string(),
            ));
        }
        if threshold as usize > owners.active_count() {
            return Err(WalletError::ThresholdViolation(format!(
                "threshold {} exceeds owner count {}",
                threshold,
                owners.active_count()
            )));
        }

        for responder in &emergency_responders {
            validate_address(responder)?;
            if !owners.is_active(responder) {
                return Err(WalletError::OwnerNotFound(responder.clone()));
            }
        }

        Ok(Self {
            address,
            owners,
            threshold,
            time_lock_secs,
            emergency_responders,
            ledger: Vec::new(),
            events: Vec::new(),
            executing: false,
        })
    }

    /// Submit a new transaction, implicitly confirmed by the submitter
    ///
    /// If the submitter's confirmation already satisfies the threshold
    /// (threshold of one), execution is attempted immediately under the
    /// same rules as `confirm`.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners, `EmergencyNotPermitted` for an
    /// emergency submission by a non-responder, `ZeroAddress` for a blank
    /// target.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        caller: &str,
        to: &str,
        value: u64,
        payload: Vec<u8>,
        description: &str,
        is_emergency: bool,
        target: &mut dyn CallTarget,
    ) -> Result<u64, WalletError> {
        self.ensure_not_executing()?;
        validate_address(to)?;
        self.ensure_active_owner(caller)?;
        if is_emergency && !self.is_emergency_responder(caller) {
            return Err(WalletError::EmergencyNotPermitted(caller.to_string()));
        }

        let id = self.ledger.len() as u64;
        let tx = Transaction::new(
            id,
            to.to_string(),
            value,
            payload,
            description.to_string(),
            is_emergency,
            caller,
        );
        let now = tx.submitted_at;
        self.ledger.push(tx);

        self.events.push(WalletEvent::TransactionSubmitted {
            tx_id: id,
            submitter: caller.to_string(),
            at: now,
        });
        self.events.push(WalletEvent::TransactionConfirmed {
            tx_id: id,
            owner: caller.to_string(),
            at: now,
        });
        self.owners.touch(caller);
        log::debug!("wallet {}: tx {} submitted by {}", self.address, id, caller);

        self.capture_threshold(id);
        self.try_execute_if_eligible(id, caller, target);
        Ok(id)
    }

    /// Confirm a pending transaction
    ///
    /// The confirmation that satisfies the threshold captures the
    /// threshold timestamp and attempts execution in the same call. A
    /// transaction still inside its time-lock stays pending for a later
    /// `execute_transaction`; the confirmation itself always sticks.
    ///
    /// # Errors
    /// `Unauthorized`, `NotFound`, `AlreadyExecuted`, `AlreadyConfirmed`.
    pub fn confirm(
        &mut self,
        caller: &str,
        tx_id: u64,
        target: &mut dyn CallTarget,
    ) -> Result<(), WalletError> {
        self.ensure_not_executing()?;
        self.ensure_active_owner(caller)?;

        let tx = self
            .ledger
            .get_mut(tx_id as usize)
            .ok_or(WalletError::NotFound(tx_id))?;
        tx.add_confirmation(caller)?;

        self.events.push(WalletEvent::TransactionConfirmed {
            tx_id,
            owner: caller.to_string(),
            at: Utc::now(),
        });
        self.owners.touch(caller);
        log::debug!("wallet {}: tx {} confirmed by {}", self.address, tx_id, caller);

        self.capture_threshold(tx_id);
        self.try_execute_if_eligible(tx_id, caller, target);
        Ok(())
    }

    /// Withdraw a confirmation from a pending transaction
    ///
    /// Deliberately leaves the captured threshold timestamp untouched:
    /// confirm/revoke cycling cannot reset a running time-lock.
    ///
    /// # Errors
    /// `Unauthorized`, `NotFound`, `AlreadyExecuted`, `NotConfirmed`.
    pub fn revoke_confirmation(&mut self, caller: &str, tx_id: u64) -> Result<(), WalletError> {
        self.ensure_not_executing()?;
        self.ensure_active_owner(caller)?;

        let tx = self
            .ledger
            .get_mut(tx_id as usize)
            .ok_or(WalletError::NotFound(tx_id))?;
        tx.remove_confirmation(caller)?;

        self.events.push(WalletEvent::TransactionRevoked {
            tx_id,
            owner: caller.to_string(),
            at: Utc::now(),
        });
        self.owners.touch(caller);
        Ok(())
    }

    /// Explicit retry path for transactions that met the threshold but
    /// were blocked by the time-lock when the last confirmation arrived
    ///
    /// # Errors
    /// `Unauthorized`, `NotFound`, `AlreadyExecuted`,
    /// `InsufficientConfirmations`, `TimeLockNotElapsed`.
    pub fn execute_transaction(
        &mut self,
        caller: &str,
        tx_id: u64,
        target: &mut dyn CallTarget,
    ) -> Result<(), WalletError> {
        self.ensure_not_executing()?;
        self.ensure_active_owner(caller)?;

        let tx = self
            .ledger
            .get(tx_id as usize)
            .ok_or(WalletError::NotFound(tx_id))?;
        if tx.executed {
            return Err(WalletError::AlreadyExecuted(tx_id));
        }
        if tx.confirmation_count() < self.threshold as usize {
            return Err(WalletError::InsufficientConfirmations {
                have: tx.confirmation_count(),
                need: self.threshold,
            });
        }

        self.capture_threshold(tx_id);
        let tx = &self.ledger[tx_id as usize];
        let reached = tx
            .threshold_reached_at
            .unwrap_or(tx.submitted_at);
        if !timelock::is_eligible(Utc::now(), reached, self.time_lock_secs, tx.is_emergency) {
            return Err(WalletError::TimeLockNotElapsed {
                eligible_at: timelock::eligible_at(reached, self.time_lock_secs, tx.is_emergency),
            });
        }

        self.perform_execution(tx_id, caller, target);
        Ok(())
    }

    // ---- read-only accessors -------------------------------------------

    /// This wallet's address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Required confirmation threshold
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Time-lock duration in seconds
    pub fn time_lock_secs(&self) -> u64 {
        self.time_lock_secs
    }

    /// Addresses of all active owners, in registration order
    pub fn get_owners(&self) -> Vec<&str> {
        self.owners.active_addresses()
    }

    /// Whether the address is a currently active owner
    pub fn is_owner(&self, address: &str) -> bool {
        self.owners.is_active(address)
    }

    /// Full owner record (active or deactivated), with metadata
    pub fn get_owner_info(&self, address: &str) -> Option<&Owner> {
        self.owners.get(address)
    }

    /// The underlying registry, for audit enumeration
    pub fn owner_registry(&self) -> &OwnerRegistry {
        &self.owners
    }

    /// Whether the address may submit emergency transactions
    pub fn is_emergency_responder(&self, address: &str) -> bool {
        self.emergency_responders.iter().any(|r| r == address)
    }

    /// Registered emergency responders
    pub fn emergency_responders(&self) -> &[String] {
        &self.emergency_responders
    }

    /// Look up a ledger entry
    pub fn get_transaction(&self, tx_id: u64) -> Option<&Transaction> {
        self.ledger.get(tx_id as usize)
    }

    /// Whether the owner has confirmed the transaction
    pub fn is_confirmed_by(&self, tx_id: u64, address: &str) -> bool {
        self.get_transaction(tx_id)
            .is_some_and(|tx| tx.is_confirmed_by(address))
    }

    /// Total number of ledger entries
    pub fn transaction_count(&self) -> usize {
        self.ledger.len()
    }

    /// Unexecuted transactions, oldest first
    pub fn pending_transactions(&self) -> Vec<&Transaction> {
        self.ledger.iter().filter(|tx| !tx.executed).collect()
    }

    /// The observable event journal, oldest first
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    // ---- internals -----------------------------------------------------

    fn ensure_not_executing(&self) -> Result<(), WalletError> {
        if self.executing {
            return Err(WalletError::ReentrantCall);
        }
        Ok(())
    }

    fn ensure_active_owner(&self, caller: &str) -> Result<(), WalletError> {
        if !self.owners.is_active(caller) {
            return Err(WalletError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Capture the threshold timestamp exactly once
    fn capture_threshold(&mut self, tx_id: u64) {
        let threshold = self.threshold as usize;
        if let Some(tx) = self.ledger.get_mut(tx_id as usize) {
            if !tx.executed
                && tx.threshold_reached_at.is_none()
                && tx.confirmation_count() >= threshold
            {
                tx.threshold_reached_at = Some(Utc::now());
            }
        }
    }

    /// Best-effort execution after a confirmation: runs only when the
    /// threshold is met and the time-lock (if any) has elapsed. A
    /// transaction still inside its lock simply stays pending.
    fn try_execute_if_eligible(&mut self, tx_id: u64, caller: &str, target: &mut dyn CallTarget) {
        let tx = &self.ledger[tx_id as usize];
        if tx.executed || tx.confirmation_count() < self.threshold as usize {
            return;
        }
        let Some(reached) = tx.threshold_reached_at else {
            return;
        };
        if !timelock::is_eligible(Utc::now(), reached, self.time_lock_secs, tx.is_emergency) {
            log::debug!(
                "wallet {}: tx {} reached threshold, waiting out time-lock",
                self.address,
                tx_id
            );
            return;
        }
        self.perform_execution(tx_id, caller, target);
    }

    /// Dispatch the payload and mark the transaction executed
    ///
    /// `executed` flips on any attempted call: a failed downstream call
    /// is terminal and needs a fresh transaction. The outcome is recorded
    /// on the ledger entry so audit can tell the two apart.
    fn perform_execution(&mut self, tx_id: u64, caller: &str, target: &mut dyn CallTarget) {
        let (to, value, payload) = {
            let tx = &self.ledger[tx_id as usize];
            (tx.to.clone(), tx.value, tx.payload.clone())
        };

        self.executing = true;
        let outcome = if to == self.address {
            self.apply_governance(tx_id, &payload)
        } else {
            target.call(&to, value, &payload)
        };
        self.executing = false;

        if outcome.success {
            log::info!("wallet {}: tx {} executed", self.address, tx_id);
        } else {
            log::warn!(
                "wallet {}: tx {} executed, downstream call failed",
                self.address,
                tx_id
            );
        }

        let now = Utc::now();
        let tx = &mut self.ledger[tx_id as usize];
        tx.executed = true;
        tx.executed_at = Some(now);
        tx.outcome = Some(outcome);

        self.events
            .push(WalletEvent::TransactionExecuted { tx_id, at: now });
        self.owners.touch(caller);
    }

    /// Decode and apply a self-targeted governance payload
    ///
    /// A payload that fails to decode, or an operation that fails its own
    /// preconditions, is a failed call: the configuration is untouched
    /// and the error text becomes the call's return data.
    fn apply_governance(&mut self, tx_id: u64, payload: &[u8]) -> CallOutcome {
        let op = match GovernanceOp::decode(payload) {
            Ok(op) => op,
            Err(e) => {
                log::warn!("wallet {}: undecodable governance payload: {}", self.address, e);
                return CallOutcome::failed(e.to_string().into_bytes());
            }
        };

        let result = match op {
            GovernanceOp::AddOwner {
                address,
                role,
                device_class,
            } => self.add_owner(&address, &role, &device_class),
            GovernanceOp::RemoveOwner { address } => self.remove_owner(&address, tx_id),
        };

        match result {
            Ok(()) => CallOutcome::ok(Vec::new()),
            Err(e) => {
                log::warn!("wallet {}: governance op rejected: {}", self.address, e);
                CallOutcome::failed(e.to_string().into_bytes())
            }
        }
    }

    fn add_owner(&mut self, address: &str, role: &str, device_class: &str) -> Result<(), WalletError> {
        self.owners.add(address, role, device_class)?;
        self.events.push(WalletEvent::OwnerAdded {
            address: address.to_string(),
            at: Utc::now(),
        });
        log::info!("wallet {}: owner {} added", self.address, address);
        Ok(())
    }

    /// Deactivate an owner and prune its confirmations from every other
    /// pending transaction, keeping confirmation counts within the active
    /// owner set. The executing transaction itself is left intact so its
    /// audit record shows the confirmations it executed with.
    fn remove_owner(&mut self, address: &str, executing_tx: u64) -> Result<(), WalletError> {
        if !self.owners.is_active(address) {
            return Err(WalletError::OwnerNotFound(address.to_string()));
        }
        if self.owners.active_count() - 1 < self.threshold as usize {
            return Err(WalletError::ThresholdViolation(format!(
                "removing {} would leave {} active owners below threshold {}",
                address,
                self.owners.active_count() - 1,
                self.threshold
            )));
        }

        self.owners.deactivate(address)?;

        let mut pruned = 0;
        for tx in &mut self.ledger {
            if !tx.executed && tx.id != executing_tx && tx.is_confirmed_by(address) {
                tx.confirmations.retain(|c| c.owner != address);
                pruned += 1;
            }
        }
        if pruned > 0 {
            log::debug!(
                "wallet {}: pruned confirmations of {} from {} pending transaction(s)",
                self.address,
                address,
                pruned
            );
        }

        self.events.push(WalletEvent::OwnerRemoved {
            address: address.to_string(),
            at: Utc::now(),
        });
        log::info!("wallet {}: owner {} removed", self.address, address);
        Ok(())
    }
}
