//! Dashboard session
//!
//! Couples the primary wallet, the access gate, the sniper wallet manager and
//! the market state. Every action is caught here: failures become feedback and
//! never escape as panics.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::access::{check_access, AccessStatus, TokenBalanceOracle};
use crate::error::Result;
use crate::market::{ActiveSnipe, DashboardTab, MarketState, RealizedSale};
use crate::wallet::{
    BalancePoller, RefreshOutcome, SniperWallet, SniperWalletManager, TransferAck,
    WalletCapability, WalletEvent,
};

use super::feedback::{Accepted, Feedback};
use super::view::{DashboardView, SessionFacts};

/// One user's dashboard
pub struct DashboardSession {
    wallet: Arc<dyn WalletCapability>,
    oracle: Arc<dyn TokenBalanceOracle>,
    sniper: Arc<SniperWalletManager>,
    market: RwLock<MarketState>,
    access: RwLock<Option<AccessStatus>>,
    feedback: RwLock<Option<Feedback>>,
    poller: Mutex<Option<BalancePoller>>,
    refresh_interval: Duration,
}

impl DashboardSession {
    pub fn new(
        wallet: Arc<dyn WalletCapability>,
        oracle: Arc<dyn TokenBalanceOracle>,
        sniper: Arc<SniperWalletManager>,
        market: MarketState,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            wallet,
            oracle,
            sniper,
            market: RwLock::new(market),
            access: RwLock::new(None),
            feedback: RwLock::new(None),
            poller: Mutex::new(None),
            refresh_interval,
        }
    }

    /// Load the persisted sniper wallet, run the first access check and start
    /// listening for wallet lifecycle events
    pub async fn start(self: &Arc<Self>) -> Result<WalletListener> {
        if let Some(wallet) = self.sniper.load_persisted().await? {
            debug!("Resuming sniper wallet {}", wallet.public_key);
            self.restart_poller().await;
        }

        if self.wallet.is_connected() {
            self.refresh_access().await;
        }

        let mut subscription = self.wallet.subscribe();
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                session.handle_wallet_event(event).await;
            }
            debug!("Wallet event stream closed");
        });

        Ok(WalletListener { handle })
    }

    /// React to a wallet lifecycle event
    pub async fn handle_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::Connect(pubkey) | WalletEvent::AccountChanged(Some(pubkey)) => {
                info!("Wallet {} active, checking access", pubkey);
                self.refresh_access().await;
            }
            WalletEvent::AccountChanged(None) | WalletEvent::Disconnect => {
                info!("Wallet gone, hiding dashboard data");
                self.set_access(AccessStatus::denied()).await;
            }
        }
    }

    /// Re-run the access gate for the connected wallet
    pub async fn refresh_access(&self) -> AccessStatus {
        let status = match self.wallet.public_key() {
            Some(pubkey) => match check_access(self.oracle.as_ref(), &pubkey).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Access check failed for {}: {}", pubkey, e);
                    AccessStatus::denied()
                }
            },
            None => AccessStatus::denied(),
        };

        self.set_access(status).await;
        status
    }

    pub async fn view(&self) -> DashboardView {
        let facts = SessionFacts {
            wallet_address: self.wallet.public_key().map(|k| k.to_string()),
            access: *self.access.read().await,
            sniper_wallet: self.sniper.current().await,
            processing: self.sniper.is_processing(),
            feedback: self.feedback.read().await.clone(),
        };
        let market = self.market.read().await;
        DashboardView::build(&market, facts)
    }

    pub async fn enable_monitoring(&self, handle: &str, amount: &str) -> Result<Accepted<ActiveSnipe>> {
        let result = self.market.write().await.enable_monitoring(handle, amount);
        self.record(result.map(|snipe| {
            Accepted::new(
                format!("Now monitoring {} for new token launches", snipe.target),
                snipe,
            )
        }))
        .await
    }

    pub async fn set_direct_snipe(&self, ticker: &str, amount: &str) -> Result<Accepted<ActiveSnipe>> {
        let result = self.market.write().await.set_direct_snipe(ticker, amount);
        self.record(result.map(|snipe| {
            Accepted::new(format!("Snipe set for {}", snipe.target), snipe)
        }))
        .await
    }

    /// Pre-fill the configuration tab from a catalog row; no-op for unknown names
    pub async fn snipe_from_catalog(&self, name: &str) -> Option<String> {
        self.market.write().await.snipe_from_catalog(name)
    }

    pub async fn set_active_tab(&self, tab: DashboardTab) {
        self.market.write().await.set_active_tab(tab);
    }

    pub async fn cancel_snipe(&self, id: Uuid) -> Option<ActiveSnipe> {
        self.market.write().await.cancel_snipe(id)
    }

    pub async fn cancel_snipe_by_target(&self, target: &str) -> Option<ActiveSnipe> {
        self.market.write().await.cancel_snipe_by_target(target)
    }

    pub async fn sell_position(&self, id: Uuid) -> Option<RealizedSale> {
        self.market.write().await.sell_position(id)
    }

    pub async fn sell_position_by_token(&self, token: &str) -> Option<RealizedSale> {
        self.market.write().await.sell_position_by_token(token)
    }

    pub async fn sniper_wallet(&self) -> Option<SniperWallet> {
        self.sniper.current().await
    }

    /// Generate the sniper wallet and start polling its balance
    pub async fn generate_sniper_wallet(&self) -> Result<Accepted<SniperWallet>> {
        let result = self.sniper.generate().await;
        if result.is_ok() {
            self.restart_poller().await;
        }
        self.record(result.map(|wallet| {
            Accepted::new(
                format!("Sniper wallet created: {}", wallet.public_key),
                wallet,
            )
        }))
        .await
    }

    pub async fn refresh_sniper_balance(&self) -> Result<RefreshOutcome> {
        self.sniper.refresh_balance().await
    }

    pub async fn deposit(&self, amount: &str) -> Result<Accepted<TransferAck>> {
        let result = self.sniper.deposit(amount).await;
        self.record(result.map(|ack| {
            Accepted::new(
                format!("Deposited {} SOL to sniper wallet", ack.amount_sol),
                ack,
            )
        }))
        .await
    }

    pub async fn withdraw(&self, amount: &str) -> Result<Accepted<TransferAck>> {
        let result = self.sniper.withdraw(amount).await;
        self.record(result.map(|ack| {
            Accepted::new(
                format!("Withdrew {} SOL from sniper wallet", ack.amount_sol),
                ack,
            )
        }))
        .await
    }

    async fn set_access(&self, status: AccessStatus) {
        self.market.write().await.apply_access(&status);
        *self.access.write().await = Some(status);
    }

    /// Replace the balance poller; the old one stops when dropped
    async fn restart_poller(&self) {
        let poller = self.sniper.start_polling(self.refresh_interval).await;
        *self.poller.lock().await = poller;
    }

    async fn record<T>(&self, result: Result<Accepted<T>>) -> Result<Accepted<T>> {
        let feedback = match &result {
            Ok(accepted) => accepted.feedback(),
            Err(e) => {
                if !e.is_user_error() {
                    warn!("Dashboard action failed: {}", e);
                }
                Feedback::error(e)
            }
        };
        *self.feedback.write().await = Some(feedback);
        result
    }
}

/// Handle to the wallet event listener; dropping it unsubscribes
pub struct WalletListener {
    handle: JoinHandle<()>,
}

impl Drop for WalletListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
