//! Threshold multi-signature authorization wallet
//!
//! A wallet instance collects owner confirmations for proposed
//! transactions and performs the external call once the confirmation
//! threshold is met and the per-transaction time-lock has elapsed.
//! Owner management routes back through the same mechanism as
//! self-targeted governance transactions.
//!
//! # Example
//!
//! ```ignore
//! use crawlpay_wallet::wallet::{AuthorizationWallet, OwnerSpec};
//!
//! // Create a 2-of-3 wallet with a one-hour time-lock
//! let mut wallet = AuthorizationWallet::new(address, &owners, 2, 3600, responders)?;
//!
//! // Propose a payment and collect confirmations
//! let id = wallet.submit(&alice, &payee, 250, payload, "Crawl fee", false, &mut target)?;
//! wallet.confirm(&bob, id, &mut target)?;
//!
//! // After the time-lock, any owner may retry execution
//! wallet.execute_transaction(&carol, id, &mut target)?;
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod governance;
pub mod owner;
pub mod timelock;
pub mod transaction;

pub use engine::{AuthorizationWallet, CallTarget};
pub use error::WalletError;
pub use events::WalletEvent;
pub use governance::GovernanceOp;
pub use owner::{Owner, OwnerRegistry, OwnerSpec};
pub use transaction::{CallOutcome, Confirmation, Transaction};
