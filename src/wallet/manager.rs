//! Sniper wallet manager - core wallet operations
//!
//! Owns the dedicated trading keypair: generation, persistence, balance
//! polling, deposit from the primary wallet and withdrawal back to it.
//!
//! Balance reads are versioned. Every read takes a sequence number and its
//! result is stored only if no newer read was issued in the meantime, so a slow
//! poll cannot overwrite the balance observed after a confirmed transfer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::capability::WalletCapability;
use super::keystore::Keystore;
use super::storage::LocalStore;
use super::transfer::{lamports_to_sol, parse_sol_amount, sol_to_lamports, transfer_transaction};
use super::types::{RefreshOutcome, SniperWallet, TransferAck};

/// Sniper wallet manager
pub struct SniperWalletManager {
    /// The user's primary wallet
    wallet: Arc<dyn WalletCapability>,

    /// Custody of the sniper secret key
    keystore: Arc<dyn Keystore>,

    /// Durable storage for the public record
    store: LocalStore,

    /// Key of the record in `store`
    storage_key: String,

    /// Current sniper wallet, if any
    current: RwLock<Option<SniperWallet>>,

    /// Sequence number of the most recently issued balance read
    balance_seq: AtomicU64,

    /// Set while a deposit or withdrawal is in flight
    processing: AtomicBool,
}

impl SniperWalletManager {
    pub fn new(
        wallet: Arc<dyn WalletCapability>,
        keystore: Arc<dyn Keystore>,
        store: LocalStore,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            keystore,
            store,
            storage_key: storage_key.into(),
            current: RwLock::new(None),
            balance_seq: AtomicU64::new(0),
            processing: AtomicBool::new(false),
        }
    }

    /// Adopt the persisted record, if there is one
    pub async fn load_persisted(&self) -> Result<Option<SniperWallet>> {
        let record: Option<SniperWallet> = self.store.get(&self.storage_key)?;

        let record = match record {
            Some(record) if record.is_initialized => record,
            Some(_) => {
                debug!("Ignoring uninitialized sniper wallet record");
                return Ok(None);
            }
            None => return Ok(None),
        };

        let pubkey = record.pubkey()?;
        if !self.keystore.contains(&pubkey) {
            warn!(
                "Keystore does not hold the key for sniper wallet {}; withdrawals will fail",
                pubkey
            );
        }

        info!("Loaded sniper wallet {}", pubkey);
        *self.current.write().await = Some(record.clone());
        Ok(Some(record))
    }

    /// Current sniper wallet
    pub async fn current(&self) -> Option<SniperWallet> {
        self.current.read().await.clone()
    }

    /// Generate a new sniper wallet
    ///
    /// Requires the primary wallet to be connected. An existing sniper wallet
    /// is never replaced; its key may still hold funds.
    pub async fn generate(&self) -> Result<SniperWallet> {
        if !self.wallet.is_connected() {
            return Err(Error::NotConnected);
        }

        let mut current = self.current.write().await;
        if let Some(existing) = current.as_ref() {
            return Err(Error::SniperWalletExists(existing.public_key.clone()));
        }

        let keypair = Keypair::new();
        self.keystore.store(&keypair)?;

        let record = SniperWallet::new(&keypair.pubkey());
        self.store.set(&self.storage_key, &record)?;

        info!("Generated sniper wallet {}", record.public_key);
        *current = Some(record.clone());
        Ok(record)
    }

    /// Read the sniper wallet balance from the cluster
    pub async fn refresh_balance(&self) -> Result<RefreshOutcome> {
        let wallet = self.current().await.ok_or(Error::NoSniperWallet)?;
        let pubkey = wallet.pubkey()?;

        let seq = self.next_seq();
        let lamports = self.wallet.connection().get_balance(&pubkey).await?;
        Ok(self.apply_balance(seq, &pubkey, lamports_to_sol(lamports)).await)
    }

    /// Move SOL from the primary wallet into the sniper wallet
    ///
    /// Waits for confirmation, then re-reads the sniper balance. Returns the
    /// new balance in SOL. Any failure up to confirmation leaves the stored
    /// balance untouched.
    pub async fn deposit(&self, amount: &str) -> Result<TransferAck> {
        let from = self.connected_key()?;
        let sniper = self.current().await.ok_or(Error::NoSniperWallet)?;
        let amount_sol = parse_sol_amount(amount)?;
        let _processing = self.begin_processing()?;

        let to = sniper.pubkey()?;
        info!("Depositing {} SOL from {} to sniper wallet {}", amount_sol, from, to);

        let transaction = transfer_transaction(&from, &to, sol_to_lamports(amount_sol));
        let signature = self
            .wallet
            .send_transaction(transaction)
            .await
            .map_err(|e| Error::DepositFailed(e.to_string()))?;

        let connection = self.wallet.connection();
        connection
            .confirm_transaction(&signature)
            .await
            .map_err(|e| Error::DepositFailed(e.to_string()))?;

        let new_balance = self.reread_after_transfer(&to).await;

        info!("Deposit confirmed: {} SOL (sig: {})", amount_sol, signature);
        Ok(TransferAck::new(&signature, amount_sol, new_balance))
    }

    /// Move SOL from the sniper wallet back to the primary wallet
    ///
    /// Signed by the keystore, never by the primary wallet.
    pub async fn withdraw(&self, amount: &str) -> Result<TransferAck> {
        let to = self.connected_key()?;
        let sniper = self.current().await.ok_or(Error::NoSniperWallet)?;
        let amount_sol = parse_sol_amount(amount)?;
        let _processing = self.begin_processing()?;

        let from = sniper.pubkey()?;
        info!("Withdrawing {} SOL from sniper wallet {} to {}", amount_sol, from, to);

        let connection = self.wallet.connection();
        let blockhash = connection
            .latest_blockhash()
            .await
            .map_err(|e| Error::WithdrawFailed(e.to_string()))?;

        let mut transaction = transfer_transaction(&from, &to, sol_to_lamports(amount_sol));
        self.keystore
            .sign(&from, &mut transaction, blockhash)
            .map_err(|e| Error::WithdrawFailed(e.to_string()))?;

        let signature = connection
            .send_transaction(&transaction)
            .await
            .map_err(|e| Error::WithdrawFailed(e.to_string()))?;
        connection
            .confirm_transaction(&signature)
            .await
            .map_err(|e| Error::WithdrawFailed(e.to_string()))?;

        let new_balance = self.reread_after_transfer(&from).await;

        info!("Withdrawal confirmed: {} SOL (sig: {})", amount_sol, signature);
        Ok(TransferAck::new(&signature, amount_sol, new_balance))
    }

    /// Whether a deposit or withdrawal is in flight
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Poll the balance now and then every `period` while the current wallet
    /// stays the same. Returns `None` when there is no wallet to poll.
    pub async fn start_polling(self: &Arc<Self>, period: Duration) -> Option<BalancePoller> {
        let watched = self.current().await?.pubkey().ok()?;
        let manager = Arc::clone(self);

        info!(
            "Polling sniper wallet {} balance every {}s",
            watched,
            period.as_secs()
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let still_watched = match manager.current().await {
                    Some(wallet) => wallet.pubkey().ok() == Some(watched),
                    None => false,
                };
                if !still_watched {
                    debug!("Sniper wallet changed, stopping poller for {}", watched);
                    break;
                }

                match manager.refresh_balance().await {
                    Ok(RefreshOutcome::Applied(wallet)) => {
                        debug!("Sniper wallet balance: {} SOL", wallet.balance)
                    }
                    Ok(RefreshOutcome::Stale) => debug!("Discarded stale balance read"),
                    Err(e) => warn!("Sniper wallet balance refresh failed: {}", e),
                }
            }
        });

        Some(BalancePoller { handle })
    }

    fn connected_key(&self) -> Result<Pubkey> {
        if !self.wallet.is_connected() {
            return Err(Error::NotConnected);
        }
        self.wallet.public_key().ok_or(Error::NotConnected)
    }

    fn next_seq(&self) -> u64 {
        self.balance_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store a balance read if it is still the latest one for this wallet
    async fn apply_balance(&self, seq: u64, pubkey: &Pubkey, balance: f64) -> RefreshOutcome {
        let mut current = self.current.write().await;

        if seq != self.balance_seq.load(Ordering::SeqCst) {
            return RefreshOutcome::Stale;
        }

        match current.as_mut() {
            Some(wallet) if wallet.pubkey().ok().as_ref() == Some(pubkey) => {
                wallet.balance = balance;
                RefreshOutcome::Applied(wallet.clone())
            }
            _ => RefreshOutcome::Stale,
        }
    }

    /// Balance of the sniper wallet after a confirmed transfer
    ///
    /// The transfer stands even if the re-read fails; the stored balance is
    /// kept and the next poll corrects it.
    async fn reread_after_transfer(&self, address: &Pubkey) -> f64 {
        let seq = self.next_seq();
        match self.wallet.connection().get_balance(address).await {
            Ok(lamports) => {
                let balance = lamports_to_sol(lamports);
                self.settle(seq, address, balance).await;
                balance
            }
            Err(e) => {
                warn!("Transfer confirmed but balance re-read failed for {}: {}", address, e);
                self.current().await.map(|w| w.balance).unwrap_or_default()
            }
        }
    }

    /// Store a post-transfer balance and persist it
    async fn settle(&self, seq: u64, pubkey: &Pubkey, balance: f64) {
        if let RefreshOutcome::Applied(wallet) = self.apply_balance(seq, pubkey, balance).await {
            if let Err(e) = self.store.set(&self.storage_key, &wallet) {
                warn!("Failed to persist sniper wallet balance: {}", e);
            }
        }
    }

    fn begin_processing(&self) -> Result<ProcessingGuard<'_>> {
        if self.processing.swap(true, Ordering::SeqCst) {
            return Err(Error::OperationInProgress);
        }
        Ok(ProcessingGuard(&self.processing))
    }
}

/// Clears the processing flag on every exit path
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to the balance polling task; dropping it stops the task
pub struct BalancePoller {
    handle: JoinHandle<()>,
}

impl BalancePoller {
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BalancePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
