//! Deterministic wallet factory
//!
//! Predicts a wallet's address from its configuration before deployment,
//! deploys instances, and exposes verification and enumeration over an
//! append-only deployment registry.

pub mod factory;

pub use factory::{DeployProfile, FactoryError, FactoryRecord, WalletFactory};
