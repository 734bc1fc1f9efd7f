//! Self-governance payloads
//!
//! Owner management is never a direct call: add/remove operations are
//! encoded into ordinary transaction payloads targeted at the wallet's
//! own address, so every ownership change passes through the same
//! threshold and time-lock as any other action.

use crate::wallet::error::WalletError;
use serde::{Deserialize, Serialize};

/// An administrative operation the wallet applies to itself
///
/// Decoded from a transaction payload only when the transaction targets
/// the wallet's own address; opaque external payloads are never parsed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GovernanceOp {
    /// Register a new owner (or reactivate a removed one)
    AddOwner {
        address: String,
        role: String,
        device_class: String,
    },
    /// Deactivate an owner, keeping its audit history
    RemoveOwner { address: String },
}

impl GovernanceOp {
    /// Encode into a transaction payload
    pub fn encode(&self) -> Result<Vec<u8>, WalletError> {
        serde_json::to_vec(self).map_err(|e| WalletError::InvalidPayload(e.to_string()))
    }

    /// Decode from a self-targeted transaction payload
    pub fn decode(payload: &[u8]) -> Result<Self, WalletError> {
        serde_json::from_slice(payload).map_err(|e| WalletError::InvalidPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let op = GovernanceOp::AddOwner {
            address: "dave".to_string(),
            role: "auditor".to_string(),
            device_class: "workstation".to_string(),
        };
        let payload = op.encode().unwrap();
        assert_eq!(GovernanceOp::decode(&payload).unwrap(), op);
    }

    #[test]
    fn test_remove_owner_encoding_is_tagged() {
        let op = GovernanceOp::RemoveOwner {
            address: "mallory".to_string(),
        };
        let payload = op.encode().unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.contains("remove_owner"));
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let result = GovernanceOp::decode(b"not a governance op");
        assert!(matches!(result, Err(WalletError::InvalidPayload(_))));
    }
}
