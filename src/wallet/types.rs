//! Core types for sniper wallet management

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::{Error, Result};

/// Public record of the sniper wallet, persisted in local storage
///
/// Wire shape: `{"publicKey": "...", "balance": 0.0, "isInitialized": true}`.
/// The secret key is never part of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SniperWallet {
    /// Base58 address
    pub public_key: String,

    /// Balance in SOL
    pub balance: f64,

    /// Set once the keypair has been generated and stored
    pub is_initialized: bool,
}

impl SniperWallet {
    /// Fresh record for a newly generated keypair
    pub fn new(pubkey: &Pubkey) -> Self {
        Self {
            public_key: pubkey.to_string(),
            balance: 0.0,
            is_initialized: true,
        }
    }

    /// Parse the stored address
    pub fn pubkey(&self) -> Result<Pubkey> {
        self.public_key
            .parse()
            .map_err(|e| Error::Storage(format!("Invalid sniper wallet address: {}", e)))
    }

    /// Copy of this record with a new balance
    pub fn with_balance(&self, balance: f64) -> Self {
        Self {
            balance,
            ..self.clone()
        }
    }
}

/// Result of a balance refresh
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The read was the most recent one issued and was stored
    Applied(SniperWallet),

    /// A newer read was issued (or the wallet changed) before this one completed
    Stale,
}

/// Confirmation of a completed deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAck {
    pub signature: String,
    pub amount_sol: f64,
    pub new_balance: f64,
}

impl TransferAck {
    pub fn new(signature: &Signature, amount_sol: f64, new_balance: f64) -> Self {
        Self {
            signature: signature.to_string(),
            amount_sol,
            new_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_shape() {
        let wallet = SniperWallet {
            public_key: "11111111111111111111111111111111".into(),
            balance: 1.5,
            is_initialized: true,
        };

        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["publicKey"], "11111111111111111111111111111111");
        assert_eq!(json["balance"], 1.5);
        assert_eq!(json["isInitialized"], true);
    }

    #[test]
    fn test_new_record_starts_empty() {
        let pubkey = Pubkey::new_unique();
        let wallet = SniperWallet::new(&pubkey);

        assert_eq!(wallet.balance, 0.0);
        assert!(wallet.is_initialized);
        assert_eq!(wallet.pubkey().unwrap(), pubkey);
        assert_eq!(wallet.with_balance(2.0).balance, 2.0);
    }

    #[test]
    fn test_bad_address_is_storage_error() {
        let wallet = SniperWallet {
            public_key: "not-an-address".into(),
            balance: 0.0,
            is_initialized: true,
        };
        assert!(matches!(wallet.pubkey(), Err(Error::Storage(_))));
    }
}
