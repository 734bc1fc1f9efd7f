//! Persistence for the wallet factory
//!
//! JSON snapshots with atomic writes and rotating backups.

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError};
