//! Wallet management module
//!
//! The sniper wallet is a dedicated keypair used for automated trading,
//! independent from the user's primary (connected) wallet.
//!
//! # Architecture
//!
//! ```text
//! WalletCapability (primary wallet + Connection)
//!          ↑
//! SniperWalletManager → Keystore (secret key custody)
//!          ↓
//!      LocalStore (public record under a fixed key)
//! ```
//!
//! # Security
//!
//! - The public record never contains key material
//! - Withdrawals are signed by the keystore, never by the primary wallet
//! - Generating a wallet never replaces an existing one

pub mod capability;
pub mod keystore;
pub mod manager;
pub mod storage;
pub mod transfer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use capability::{
    Connection, KeypairWallet, RpcConnection, WalletCapability, WalletEvent, WalletSubscription,
};
pub use keystore::{FileKeystore, Keystore, MemoryKeystore};
pub use manager::{BalancePoller, SniperWalletManager};
pub use storage::LocalStore;
pub use types::{RefreshOutcome, SniperWallet, TransferAck};
