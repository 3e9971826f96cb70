//! Primary wallet capability
//!
//! The user's connected wallet and its RPC connection, consumed as black boxes
//! by the sniper wallet manager and the access gate.
//!
//! Connection lifecycle is published through an explicit subscription
//! ([`WalletCapability::subscribe`]). Dropping the returned
//! [`WalletSubscription`] unsubscribes.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Connection-level operations against the cluster
#[async_trait]
pub trait Connection: Send + Sync {
    /// Balance of an address in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit an already signed transaction
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    /// Wait until the signature is confirmed and succeeded
    async fn confirm_transaction(&self, signature: &Signature) -> Result<()>;
}

/// The user's primary wallet
#[async_trait]
pub trait WalletCapability: Send + Sync {
    fn is_connected(&self) -> bool;

    fn public_key(&self) -> Option<Pubkey>;

    /// Sign with the wallet key and submit. The wallet fills in a recent blockhash.
    async fn send_transaction(&self, transaction: Transaction) -> Result<Signature>;

    fn connection(&self) -> Arc<dyn Connection>;

    /// Subscribe to connect / account-changed / disconnect events
    fn subscribe(&self) -> WalletSubscription;
}

/// Wallet lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletEvent {
    Connect(Pubkey),
    AccountChanged(Option<Pubkey>),
    Disconnect,
}

/// Publisher side of the lifecycle events
pub struct WalletEvents {
    sender: broadcast::Sender<WalletEvent>,
}

impl WalletEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, event: WalletEvent) {
        // No subscribers is fine
        if self.sender.send(event).is_err() {
            debug!("No subscribers for wallet event {:?}", event);
        }
    }

    pub fn subscribe(&self) -> WalletSubscription {
        WalletSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WalletEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber handle; drop to unsubscribe
pub struct WalletSubscription {
    receiver: broadcast::Receiver<WalletEvent>,
}

impl WalletSubscription {
    /// Next event, or `None` once the wallet is gone
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Wallet event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Connection backed by a Solana JSON-RPC endpoint
pub struct RpcConnection {
    client: RpcClient,
}

impl RpcConnection {
    pub fn new(endpoint: String, timeout: Duration, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(endpoint, timeout, commitment),
        }
    }
}

#[async_trait]
impl Connection for RpcConnection {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get blockhash: {}", e)))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| Error::TransactionSend(e.to_string()))
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<()> {
        self.client
            .poll_for_signature(signature)
            .await
            .map_err(|e| Error::TransactionConfirm(e.to_string()))?;

        // poll_for_signature only waits for the signature to land
        match self.client.get_signature_status(signature).await {
            Ok(Some(Ok(()))) => Ok(()),
            Ok(Some(Err(e))) => Err(Error::TransactionConfirm(format!(
                "Transaction {} failed: {}",
                signature, e
            ))),
            Ok(None) => Err(Error::TransactionConfirm(format!(
                "Transaction {} not found",
                signature
            ))),
            Err(e) => Err(Error::TransactionConfirm(e.to_string())),
        }
    }
}

/// Primary wallet holding a local keypair
///
/// Stands in for a browser wallet adapter: `connect` and `disconnect` emit the
/// same lifecycle events an adapter would.
pub struct KeypairWallet {
    keypair: RwLock<Option<Arc<Keypair>>>,
    connection: Arc<dyn Connection>,
    events: WalletEvents,
}

impl KeypairWallet {
    /// Create a disconnected wallet
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            keypair: RwLock::new(None),
            connection,
            events: WalletEvents::new(),
        }
    }

    /// Connect with a keypair, or switch accounts if already connected
    pub fn connect(&self, keypair: Keypair) {
        let pubkey = keypair.pubkey();
        let previous = {
            let mut guard = self.keypair.write().unwrap_or_else(|e| e.into_inner());
            guard.replace(Arc::new(keypair)).map(|k| k.pubkey())
        };

        match previous {
            None => {
                info!("Wallet connected: {}", pubkey);
                self.events.emit(WalletEvent::Connect(pubkey));
            }
            Some(old) if old != pubkey => {
                info!("Wallet account changed: {} -> {}", old, pubkey);
                self.events.emit(WalletEvent::AccountChanged(Some(pubkey)));
            }
            Some(_) => debug!("Wallet {} already connected", pubkey),
        }
    }

    pub fn disconnect(&self) {
        let previous = {
            let mut guard = self.keypair.write().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };

        if let Some(keypair) = previous {
            info!("Wallet disconnected: {}", keypair.pubkey());
            self.events.emit(WalletEvent::Disconnect);
        }
    }

    fn current(&self) -> Option<Arc<Keypair>> {
        self.keypair
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WalletCapability for KeypairWallet {
    fn is_connected(&self) -> bool {
        self.current().is_some()
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.current().map(|k| k.pubkey())
    }

    async fn send_transaction(&self, mut transaction: Transaction) -> Result<Signature> {
        let keypair = self.current().ok_or(Error::NotConnected)?;

        let blockhash = self.connection.latest_blockhash().await?;
        transaction
            .try_sign(&[keypair.as_ref()], blockhash)
            .map_err(|e| Error::Signing(e.to_string()))?;

        self.connection.send_transaction(&transaction).await
    }

    fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    fn subscribe(&self) -> WalletSubscription {
        self.events.subscribe()
    }
}

#[cfg(test)]
impl KeypairWallet {
    pub(crate) fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}
