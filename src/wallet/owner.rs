//! Owner registry with per-signer metadata
//!
//! Tracks the current signer set of a wallet. Owners are deactivated
//! rather than deleted so the audit history survives every governance
//! change.

use crate::wallet::error::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Founding descriptor for an owner, supplied at wallet deployment
/// or inside an add-owner governance payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerSpec {
    /// Owner address
    pub address: String,
    /// Role label (e.g. "publisher-admin", "finance")
    pub role: String,
    /// Device class label (e.g. "hardware-key", "mobile")
    pub device_class: String,
}

impl OwnerSpec {
    /// Create a spec without metadata labels
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            role: String::new(),
            device_class: String::new(),
        }
    }

    /// Create a spec with role and device-class metadata
    pub fn with_metadata(
        address: impl Into<String>,
        role: impl Into<String>,
        device_class: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            role: role.into(),
            device_class: device_class.into(),
        }
    }

    /// Whether both metadata labels are present
    pub fn has_metadata(&self) -> bool {
        !self.role.trim().is_empty() && !self.device_class.trim().is_empty()
    }
}

/// A registered owner of a wallet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Owner {
    /// Owner address, unique within the registry
    pub address: String,
    /// False once removed via governance; history is preserved
    pub is_active: bool,
    /// When the owner was (last) added
    pub added_at: DateTime<Utc>,
    /// When the owner was deactivated, if ever
    pub deactivated_at: Option<DateTime<Utc>>,
    /// Updated on every submit/confirm/execute by this owner
    pub last_activity_at: DateTime<Utc>,
    /// Role label
    pub role: String,
    /// Device class label
    pub device_class: String,
}

/// Reject blank addresses; the empty string plays the zero-address role.
pub fn validate_address(address: &str) -> Result<(), WalletError> {
    if address.trim().is_empty() {
        return Err(WalletError::ZeroAddress);
    }
    Ok(())
}

/// The signer set of a single wallet
///
/// Insertion order is preserved; deactivated owners stay in place.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct OwnerRegistry {
    owners: Vec<Owner>,
}

impl OwnerRegistry {
    /// Build a registry from the founding owner set
    ///
    /// # Errors
    /// Returns `ZeroAddress` for a blank address and `DuplicateOwner`
    /// for a repeated one.
    pub fn new(founders: &[OwnerSpec]) -> Result<Self, WalletError> {
        let mut registry = Self { owners: Vec::new() };
        for spec in founders {
            registry.add(&spec.address, &spec.role, &spec.device_class)?;
        }
        Ok(registry)
    }

    /// Add an owner, or reactivate a previously removed one
    ///
    /// # Errors
    /// Returns `DuplicateOwner` if the address is already active.
    pub fn add(&mut self, address: &str, role: &str, device_class: &str) -> Result<(), WalletError> {
        validate_address(address)?;

        let now = Utc::now();
        if let Some(existing) = self.find_mut(address) {
            if existing.is_active {
                return Err(WalletError::DuplicateOwner(address.to_string()));
            }
            // Reactivation: fresh added_at, metadata replaced, history kept
            existing.is_active = true;
            existing.added_at = now;
            existing.deactivated_at = None;
            existing.last_activity_at = now;
            existing.role = role.to_string();
            existing.device_class = device_class.to_string();
            return Ok(());
        }

        self.owners.push(Owner {
            address: address.to_string(),
            is_active: true,
            added_at: now,
            deactivated_at: None,
            last_activity_at: now,
            role: role.to_string(),
            device_class: device_class.to_string(),
        });
        Ok(())
    }

    /// Deactivate an owner, preserving its history
    ///
    /// # Errors
    /// Returns `OwnerNotFound` if the address is not currently active.
    pub fn deactivate(&mut self, address: &str) -> Result<(), WalletError> {
        let owner = self
            .find_mut(address)
            .filter(|o| o.is_active)
            .ok_or_else(|| WalletError::OwnerNotFound(address.to_string()))?;

        owner.is_active = false;
        owner.deactivated_at = Some(Utc::now());
        Ok(())
    }

    /// Look up an owner by address (active or not)
    pub fn get(&self, address: &str) -> Option<&Owner> {
        self.owners.iter().find(|o| o.address == address)
    }

    /// Whether the address is a currently active owner
    pub fn is_active(&self, address: &str) -> bool {
        self.get(address).is_some_and(|o| o.is_active)
    }

    /// Number of currently active owners
    pub fn active_count(&self) -> usize {
        self.owners.iter().filter(|o| o.is_active).count()
    }

    /// Addresses of all active owners, in registration order
    pub fn active_addresses(&self) -> Vec<&str> {
        self.owners
            .iter()
            .filter(|o| o.is_active)
            .map(|o| o.address.as_str())
            .collect()
    }

    /// Update an owner's last-activity timestamp
    pub fn touch(&mut self, address: &str) {
        if let Some(owner) = self.find_mut(address) {
            owner.last_activity_at = Utc::now();
        }
    }

    /// Iterate over all owners, active and deactivated
    pub fn iter(&self) -> impl Iterator<Item = &Owner> {
        self.owners.iter()
    }

    fn find_mut(&mut self, address: &str) -> Option<&mut Owner> {
        self.owners.iter_mut().find(|o| o.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn founders() -> Vec<OwnerSpec> {
        vec![
            OwnerSpec::with_metadata("alice", "publisher-admin", "hardware-key"),
            OwnerSpec::with_metadata("bob", "finance", "mobile"),
            OwnerSpec::new("carol"),
        ]
    }

    #[test]
    fn test_registry_creation() {
        let registry = OwnerRegistry::new(&founders()).unwrap();
        assert_eq!(registry.active_count(), 3);
        assert!(registry.is_active("alice"));
        assert_eq!(registry.get("alice").unwrap().role, "publisher-admin");
        assert_eq!(registry.active_addresses(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_duplicate_founder_rejected() {
        let specs = vec![OwnerSpec::new("alice"), OwnerSpec::new("alice")];
        assert!(matches!(
            OwnerRegistry::new(&specs),
            Err(WalletError::DuplicateOwner(_))
        ));
    }

    #[test]
    fn test_blank_address_rejected() {
        let specs = vec![OwnerSpec::new("  ")];
        assert!(matches!(
            OwnerRegistry::new(&specs),
            Err(WalletError::ZeroAddress)
        ));
    }

    #[test]
    fn test_deactivate_preserves_history() {
        let mut registry = OwnerRegistry::new(&founders()).unwrap();
        registry.deactivate("bob").unwrap();

        assert!(!registry.is_active("bob"));
        assert_eq!(registry.active_count(), 2);

        // History stays queryable
        let bob = registry.get("bob").unwrap();
        assert!(bob.deactivated_at.is_some());
        assert_eq!(bob.role, "finance");

        // Deactivating twice fails
        assert!(matches!(
            registry.deactivate("bob"),
            Err(WalletError::OwnerNotFound(_))
        ));
    }

    #[test]
    fn test_reactivation() {
        let mut registry = OwnerRegistry::new(&founders()).unwrap();
        registry.deactivate("carol").unwrap();

        registry.add("carol", "auditor", "workstation").unwrap();
        let carol = registry.get("carol").unwrap();
        assert!(carol.is_active);
        assert!(carol.deactivated_at.is_none());
        assert_eq!(carol.role, "auditor");

        // Still a single registry entry
        assert_eq!(registry.iter().count(), 3);
    }

    #[test]
    fn test_add_active_owner_fails() {
        let mut registry = OwnerRegistry::new(&founders()).unwrap();
        assert!(matches!(
            registry.add("alice", "", ""),
            Err(WalletError::DuplicateOwner(_))
        ));
    }

    #[test]
    fn test_touch_updates_activity() {
        let mut registry = OwnerRegistry::new(&founders()).unwrap();
        let before = registry.get("alice").unwrap().last_activity_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.touch("alice");
        assert!(registry.get("alice").unwrap().last_activity_at > before);
    }
}
