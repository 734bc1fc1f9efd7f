//! Wallet factory with deterministic addressing
//!
//! Derives a wallet's address as a pure hash of its configuration
//! (owner set, threshold, salt) before deployment, deploys instances,
//! and keeps an append-only registry of everything it has deployed.

use crate::crypto::{double_sha256, sha256, sha256_hex};
use crate::wallet::{AuthorizationWallet, OwnerSpec, WalletError};
use chrono::{DateTime, Utc};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::collections::HashMap;
use thiserror::Error;

/// Errors related to wallet deployment
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Wallet already deployed at {0}")]
    AlreadyDeployed(String),
    #[error("Profile requires role and device metadata for owner {0}")]
    MissingOwnerMetadata(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Deployment parameters exposed as presets
///
/// Both profiles parameterize the same `deploy` call; there is no
/// separate engine per environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployProfile {
    /// Confirmation threshold
    pub threshold: u8,
    /// Time-lock duration in seconds
    pub time_lock_secs: u64,
    /// Whether every owner must carry role/device metadata
    pub require_owner_metadata: bool,
}

impl DeployProfile {
    /// Staging preset: low threshold, five-minute time-lock
    pub fn testnet() -> Self {
        Self {
            threshold: 2,
            time_lock_secs: 300,
            require_owner_metadata: false,
        }
    }

    /// Production preset: higher threshold, 24-hour time-lock,
    /// mandatory role/device metadata per owner
    pub fn production() -> Self {
        Self {
            threshold: 3,
            time_lock_secs: 86_400,
            require_owner_metadata: true,
        }
    }
}

/// Audit row recorded once per deployment, immutable thereafter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactoryRecord {
    /// Caller-supplied salt mixed into address derivation
    pub salt: String,
    /// Address computed before deployment
    pub predicted_address: String,
    /// Address the wallet actually deployed at
    pub deployed_address: String,
    /// Fingerprint of the full deployment configuration
    pub config_hash: String,
    /// When the wallet was deployed
    pub deployed_at: DateTime<Utc>,
}

/// Factory and registry for authorization wallets
///
/// Wallets live in an append-only arena with an address index; they are
/// never removed from the registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WalletFactory {
    /// Deployed wallet instances, in deployment order
    wallets: Vec<AuthorizationWallet>,
    /// Address → arena slot
    index: HashMap<String, usize>,
    /// One record per deployment, in deployment order
    records: Vec<FactoryRecord>,
}

impl WalletFactory {
    /// Create a new empty factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the address a deployment with these inputs will produce
    ///
    /// Pure function of the inputs: no registry state is read. Owner
    /// order does not matter; addresses are sorted before hashing.
    ///
    /// Address = Base58Check(version || RIPEMD160(SHA256(threshold || sorted_owners || salt)))
    pub fn predict_address(owners: &[OwnerSpec], threshold: u8, salt: &str) -> String {
        let mut sorted: Vec<&str> = owners.iter().map(|o| o.address.as_str()).collect();
        sorted.sort_unstable();

        let mut script_data = vec![threshold];
        for address in &sorted {
            script_data.extend_from_slice(address.as_bytes());
        }
        script_data.extend_from_slice(salt.as_bytes());

        let sha256_hash = sha256(&script_data);

        let mut ripemd = Ripemd160::new();
        ripemd.update(&sha256_hash);
        let ripemd_hash = ripemd.finalize();

        // P2SH-style version byte produces addresses starting with '3'
        let mut address_bytes = vec![0x05];
        address_bytes.extend_from_slice(&ripemd_hash);

        let checksum = &double_sha256(&address_bytes)[..4];
        address_bytes.extend_from_slice(checksum);

        bs58::encode(address_bytes).into_string()
    }

    /// Deploy a new wallet instance
    ///
    /// # Errors
    /// `AlreadyDeployed` if `(owners, threshold, salt)` collides with an
    /// existing record; configuration errors propagate from the wallet
    /// constructor.
    pub fn deploy(
        &mut self,
        owners: &[OwnerSpec],
        threshold: u8,
        salt: &str,
        time_lock_secs: u64,
        emergency_responders: Vec<String>,
    ) -> Result<String, FactoryError> {
        let predicted = Self::predict_address(owners, threshold, salt);
        if self.index.contains_key(&predicted) {
            return Err(FactoryError::AlreadyDeployed(predicted));
        }

        let wallet = AuthorizationWallet::new(
            predicted.clone(),
            owners,
            threshold,
            time_lock_secs,
            emergency_responders,
        )?;

        self.records.push(FactoryRecord {
            salt: salt.to_string(),
            predicted_address: predicted.clone(),
            deployed_address: wallet.address().to_string(),
            config_hash: Self::config_hash(owners, threshold, time_lock_secs),
            deployed_at: Utc::now(),
        });
        self.index.insert(predicted.clone(), self.wallets.len());
        self.wallets.push(wallet);

        log::info!("Wallet deployed at {}", predicted);
        Ok(predicted)
    }

    /// Deploy using a preset profile
    ///
    /// # Errors
    /// `MissingOwnerMetadata` when the profile mandates role/device
    /// metadata and an owner lacks it; otherwise as `deploy`.
    pub fn deploy_with_profile(
        &mut self,
        owners: &[OwnerSpec],
        salt: &str,
        profile: &DeployProfile,
        emergency_responders: Vec<String>,
    ) -> Result<String, FactoryError> {
        if profile.require_owner_metadata {
            for owner in owners {
                if !owner.has_metadata() {
                    return Err(FactoryError::MissingOwnerMetadata(owner.address.clone()));
                }
            }
        }
        self.deploy(
            owners,
            profile.threshold,
            salt,
            profile.time_lock_secs,
            emergency_responders,
        )
    }

    /// Whether the address was deployed by this factory
    pub fn verify(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    /// Addresses of all deployed wallets, in deployment order
    pub fn list_deployed(&self) -> Vec<&str> {
        self.wallets.iter().map(|w| w.address()).collect()
    }

    /// Number of wallets deployed by this factory
    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    /// Look up a deployed wallet
    pub fn wallet(&self, address: &str) -> Option<&AuthorizationWallet> {
        self.index.get(address).map(|&slot| &self.wallets[slot])
    }

    /// Mutable access to a deployed wallet
    pub fn wallet_mut(&mut self, address: &str) -> Option<&mut AuthorizationWallet> {
        let slot = *self.index.get(address)?;
        Some(&mut self.wallets[slot])
    }

    /// Deployment record for an address
    pub fn record(&self, address: &str) -> Option<&FactoryRecord> {
        self.records.iter().find(|r| r.deployed_address == address)
    }

    /// All deployment records, in deployment order
    pub fn records(&self) -> &[FactoryRecord] {
        &self.records
    }

    fn config_hash(owners: &[OwnerSpec], threshold: u8, time_lock_secs: u64) -> String {
        let mut sorted: Vec<&str> = owners.iter().map(|o| o.address.as_str()).collect();
        sorted.sort_unstable();
        let canonical = format!("{}|{}|{}", threshold, time_lock_secs, sorted.join(","));
        sha256_hex(canonical.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(names: &[&str]) -> Vec<OwnerSpec> {
        names.iter().map(|n| OwnerSpec::new(*n)).collect()
    }

    #[test]
    fn test_predicted_address_matches_deployment() {
        let mut factory = WalletFactory::new();
        let specs = owners(&["alice", "bob", "carol"]);

        let predicted = WalletFactory::predict_address(&specs, 2, "salt-1");
        let deployed = factory.deploy(&specs, 2, "salt-1", 0, vec![]).unwrap();

        assert_eq!(predicted, deployed);
        let record = factory.record(&deployed).unwrap();
        assert_eq!(record.predicted_address, record.deployed_address);
    }

    #[test]
    fn test_address_is_deterministic_and_order_independent() {
        let a = WalletFactory::predict_address(&owners(&["alice", "bob"]), 2, "s");
        let b = WalletFactory::predict_address(&owners(&["bob", "alice"]), 2, "s");
        assert_eq!(a, b);
        // P2SH-style addresses start with '3'
        assert!(a.starts_with('3'));
    }

    #[test]
    fn test_inputs_change_the_address() {
        let specs = owners(&["alice", "bob", "carol"]);
        let base = WalletFactory::predict_address(&specs, 2, "s");
        assert_ne!(base, WalletFactory::predict_address(&specs, 3, "s"));
        assert_ne!(base, WalletFactory::predict_address(&specs, 2, "other"));
        assert_ne!(
            base,
            WalletFactory::predict_address(&owners(&["alice", "bob"]), 2, "s")
        );
    }

    #[test]
    fn test_salt_collision_rejected() {
        let mut factory = WalletFactory::new();
        let specs = owners(&["alice", "bob"]);

        factory.deploy(&specs, 2, "salt", 0, vec![]).unwrap();
        let result = factory.deploy(&specs, 2, "salt", 0, vec![]);
        assert!(matches!(result, Err(FactoryError::AlreadyDeployed(_))));
        assert_eq!(factory.wallet_count(), 1);
    }

    #[test]
    fn test_same_config_distinct_salts() {
        let mut factory = WalletFactory::new();
        let specs = owners(&["alice", "bob", "carol"]);

        let first = factory.deploy(&specs, 2, "salt-1", 0, vec![]).unwrap();
        let second = factory.deploy(&specs, 2, "salt-2", 0, vec![]).unwrap();

        assert_ne!(first, second);
        assert!(factory.verify(&first));
        assert!(factory.verify(&second));
        assert_eq!(factory.list_deployed(), vec![first.as_str(), second.as_str()]);
        // Identical configuration, distinct addresses
        assert_eq!(
            factory.record(&first).unwrap().config_hash,
            factory.record(&second).unwrap().config_hash
        );
    }

    #[test]
    fn test_verify_unknown_address() {
        let factory = WalletFactory::new();
        assert!(!factory.verify("3NotDeployedAnywhere"));
    }

    #[test]
    fn test_invalid_config_propagates() {
        let mut factory = WalletFactory::new();
        let result = factory.deploy(&owners(&["alice"]), 2, "s", 0, vec![]);
        assert!(matches!(result, Err(FactoryError::Wallet(_))));
        assert_eq!(factory.wallet_count(), 0);
    }

    #[test]
    fn test_production_profile_requires_metadata() {
        let mut factory = WalletFactory::new();
        let bare = owners(&["alice", "bob", "carol"]);

        let result =
            factory.deploy_with_profile(&bare, "s", &DeployProfile::production(), vec![]);
        assert!(matches!(result, Err(FactoryError::MissingOwnerMetadata(_))));

        let with_metadata: Vec<OwnerSpec> = ["alice", "bob", "carol"]
            .iter()
            .map(|n| OwnerSpec::with_metadata(*n, "publisher-admin", "hardware-key"))
            .collect();
        let address = factory
            .deploy_with_profile(&with_metadata, "s", &DeployProfile::production(), vec![])
            .unwrap();

        let wallet = factory.wallet(&address).unwrap();
        assert_eq!(wallet.threshold(), 3);
        assert_eq!(wallet.time_lock_secs(), 86_400);
    }

    #[test]
    fn test_testnet_profile_allows_bare_owners() {
        let mut factory = WalletFactory::new();
        let address = factory
            .deploy_with_profile(
                &owners(&["alice", "bob"]),
                "s",
                &DeployProfile::testnet(),
                vec![],
            )
            .unwrap();
        let wallet = factory.wallet(&address).unwrap();
        assert_eq!(wallet.threshold(), 2);
        assert_eq!(wallet.time_lock_secs(), 300);
    }

    #[test]
    fn test_deployed_wallet_is_operational() {
        use crate::wallet::{CallOutcome, CallTarget};

        struct Accepting;
        impl CallTarget for Accepting {
            fn call(&mut self, _to: &str, _value: u64, _payload: &[u8]) -> CallOutcome {
                CallOutcome::ok(Vec::new())
            }
        }

        let mut factory = WalletFactory::new();
        let address = factory
            .deploy(&owners(&["alice", "bob", "carol"]), 2, "s", 0, vec![])
            .unwrap();

        let mut target = Accepting;
        let wallet = factory.wallet_mut(&address).unwrap();
        let id = wallet
            .submit("alice", "payee", 10, vec![], "", false, &mut target)
            .unwrap();
        wallet.confirm("bob", id, &mut target).unwrap();
        assert!(wallet.get_transaction(id).unwrap().executed);
    }
}
