//! Error types for the dashboard backend

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dashboard backend
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Insecure keypair permissions: {0}")]
    InsecureKeypair(String),

    // User input errors
    #[error("{0}")]
    Validation(String),

    #[error("Please enter a valid amount")]
    InvalidAmount,

    // Wallet errors
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("No sniper wallet has been generated")]
    NoSniperWallet,

    #[error("Sniper wallet already exists: {0}")]
    SniperWalletExists(String),

    #[error("Another wallet operation is still in progress")]
    OperationInProgress,

    #[error("Deposit failed: {0}")]
    DepositFailed(String),

    #[error("Withdrawal failed: {0}")]
    WithdrawFailed(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    #[error("Transaction confirmation failed: {0}")]
    TransactionConfirm(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error came from user input rather than the chain or the host
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidAmount
                | Error::NotConnected
                | Error::NoSniperWallet
                | Error::SniperWalletExists(_)
                | Error::OperationInProgress
        )
    }

    /// Check if this error is a failed on-chain transfer
    pub fn is_transaction_error(&self) -> bool {
        matches!(
            self,
            Error::DepositFailed(_)
                | Error::WithdrawFailed(_)
                | Error::TransactionSend(_)
                | Error::TransactionConfirm(_)
        )
    }
}

// Conversion from solana_client errors
impl From<solana_client::client_error::ClientError> for Error {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        Error::Rpc(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
