//! CrawlPay Wallet: threshold multi-signature authorization for
//! pay-per-crawl content monetization
//!
//! This crate provides the authorization core of the platform:
//! - M-of-N threshold wallets with per-transaction time-locks
//! - Emergency bypass path for registered responders
//! - Self-referential owner governance (add/remove owners through the
//!   same threshold mechanism they are part of)
//! - Deterministic-address factory with deployment registry and
//!   testnet/production presets
//! - Append-only transaction ledger and observable event journal
//! - JSON persistence with rotating backups
//!
//! # Example
//!
//! ```rust
//! use crawlpay_wallet::factory::WalletFactory;
//! use crawlpay_wallet::wallet::{CallOutcome, CallTarget, OwnerSpec};
//!
//! struct Approve;
//! impl CallTarget for Approve {
//!     fn call(&mut self, _to: &str, _value: u64, _payload: &[u8]) -> CallOutcome {
//!         CallOutcome::ok(Vec::new())
//!     }
//! }
//!
//! // Deploy a 2-of-3 wallet with no time-lock
//! let owners = vec![
//!     OwnerSpec::new("alice"),
//!     OwnerSpec::new("bob"),
//!     OwnerSpec::new("carol"),
//! ];
//! let mut factory = WalletFactory::new();
//! let address = factory.deploy(&owners, 2, "salt", 0, vec![]).unwrap();
//!
//! // Propose and confirm a payment; the second confirmation executes it
//! let mut target = Approve;
//! let wallet = factory.wallet_mut(&address).unwrap();
//! let id = wallet
//!     .submit("alice", "payee", 250, vec![], "Crawl fee", false, &mut target)
//!     .unwrap();
//! wallet.confirm("bob", id, &mut target).unwrap();
//! assert!(wallet.get_transaction(id).unwrap().executed);
//! ```

pub mod cli;
pub mod crypto;
pub mod factory;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use factory::{DeployProfile, FactoryError, FactoryRecord, WalletFactory};
pub use storage::{Storage, StorageConfig, StorageError};
pub use wallet::{
    AuthorizationWallet, CallOutcome, CallTarget, GovernanceOp, Owner, OwnerSpec, Transaction,
    WalletError, WalletEvent,
};
