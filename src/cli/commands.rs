//! CLI command implementations

use anyhow::{Context, Result};
use dialoguer::Confirm;
use solana_client::nonblocking::rpc_client::RpcClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::access::oracle_from_config;
use crate::api::{self, AppState};
use crate::config::Config;
use crate::dashboard::DashboardSession;
use crate::market::catalog::{graduated_tokens, token_listings};
use crate::market::MarketState;
use crate::wallet::keystore::read_keypair;
use crate::wallet::{
    FileKeystore, KeypairWallet, LocalStore, RefreshOutcome, RpcConnection, SniperWallet,
    SniperWalletManager, WalletCapability,
};

/// Collaborators wired from configuration
pub struct Services {
    pub wallet: Arc<KeypairWallet>,
    pub sniper: Arc<SniperWalletManager>,
    pub session: Arc<DashboardSession>,
}

impl Services {
    pub fn build(config: &Config) -> Result<Self> {
        info!("Initializing RPC connection...");
        let connection = Arc::new(RpcConnection::new(
            config.rpc.endpoint.clone(),
            config.rpc.timeout(),
            config.rpc.commitment_config(),
        ));

        let wallet = Arc::new(KeypairWallet::new(connection));
        let sniper = Arc::new(SniperWalletManager::new(
            wallet.clone(),
            Arc::new(FileKeystore::new(config.keystore_path())),
            LocalStore::open(config.storage_path()),
            config.storage.sniper_wallet_key.clone(),
        ));

        let oracle_client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            config.rpc.endpoint.clone(),
            config.rpc.timeout(),
            config.rpc.commitment_config(),
        ));
        let oracle = oracle_from_config(&config.access, oracle_client)
            .map_err(|e| anyhow::anyhow!("Failed to create access oracle: {}", e))?;

        let session = Arc::new(DashboardSession::new(
            wallet.clone(),
            oracle,
            sniper.clone(),
            MarketState::new(config.snipe_defaults.clone()),
            Duration::from_secs(config.sniper_wallet.refresh_interval_secs),
        ));

        Ok(Self {
            wallet,
            sniper,
            session,
        })
    }

    /// Connect the primary wallet from its keypair file
    pub fn connect_primary(&self, config: &Config) -> Result<()> {
        let path = config
            .primary_wallet
            .keypair_path
            .as_deref()
            .context("primary_wallet.keypair_path (or KEYPAIR_PATH) is not set")?;

        let keypair = read_keypair(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load primary wallet: {}", e))?;
        self.wallet.connect(keypair);
        Ok(())
    }

    /// Connect the primary wallet if a keypair path is configured
    pub fn connect_configured_primary(&self, config: &Config) -> Result<bool> {
        if config.primary_wallet.keypair_path.is_none() {
            return Ok(false);
        }
        self.connect_primary(config)?;
        Ok(true)
    }
}

/// Run the HTTP API
pub async fn serve(config: &Config) -> Result<()> {
    info!("Starting SnipeOnBelieve dashboard backend...");

    let services = Services::build(config)?;

    if config.primary_wallet.auto_connect && config.primary_wallet.keypair_path.is_some() {
        services.connect_primary(config)?;
    } else {
        warn!("Primary wallet not connected - dashboard data stays hidden");
    }

    let _listener = services
        .session
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start dashboard session: {}", e))?;

    let app = api::router(AppState::new(services.session.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_addr))?;

    info!("API server listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Print the newly launched token catalog
pub fn catalog_tokens() -> Result<()> {
    println!("\n=== NEW TOKENS ===\n");
    println!(
        "{:<16} {:<8} {:>10} {:>8} {:>8} {:>10} {:<8}",
        "Name", "Ticker", "MCap", "Age", "Holders", "Liquidity", "Pool"
    );

    for token in token_listings() {
        println!(
            "{:<16} {:<8} {:>10} {:>8} {:>8} {:>10} {:<8}",
            token.name,
            token.ticker,
            token.market_cap,
            token.contract_age,
            token.holders,
            token.liquidity,
            token.pool
        );
    }

    Ok(())
}

/// Print the graduated token catalog
pub fn catalog_graduated() -> Result<()> {
    println!("\n=== GRADUATED TOKENS ===\n");
    println!(
        "{:<16} {:<8} {:>10} {:>12} {:>8} {:>10} {:>6}",
        "Name", "Ticker", "MCap", "Price", "24h", "Volume", "Txs"
    );

    for token in graduated_tokens() {
        println!(
            "{:<16} {:<8} {:>10} {:>12} {:>8} {:>10} {:>6}",
            token.name,
            token.ticker,
            token.market_cap,
            token.price,
            token.change,
            token.volume,
            token.tx_count
        );
    }

    Ok(())
}

/// Generate the sniper wallet for the configured primary wallet
pub async fn wallet_generate(config: &Config) -> Result<()> {
    let services = Services::build(config)?;
    services.connect_primary(config)?;
    services
        .sniper
        .load_persisted()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load sniper wallet: {}", e))?;

    let wallet = services
        .sniper
        .generate()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("\n=== SNIPER WALLET CREATED ===");
    println!("Address: {}", wallet.public_key);
    println!("Keystore: {}", config.keystore_path().display());
    println!("\nFund it with: sob wallet deposit <amount>");

    Ok(())
}

/// Show the persisted sniper wallet
pub async fn wallet_status(config: &Config) -> Result<()> {
    let services = Services::build(config)?;
    services.connect_configured_primary(config)?;

    println!("\n=== SNIPER WALLET ===\n");

    match load_sniper(&services).await? {
        Some(wallet) => print_wallet(&wallet),
        None => println!("No sniper wallet. Create one with: sob wallet generate"),
    }

    if let Some(primary) = services.wallet.public_key() {
        println!("Primary wallet: {}", primary);
    }

    Ok(())
}

/// Re-read the sniper wallet balance from the cluster
pub async fn wallet_refresh(config: &Config) -> Result<()> {
    let services = Services::build(config)?;
    if load_sniper(&services).await?.is_none() {
        anyhow::bail!("No sniper wallet. Create one with: sob wallet generate");
    }

    match services.sniper.refresh_balance().await {
        Ok(RefreshOutcome::Applied(wallet)) => print_wallet(&wallet),
        Ok(RefreshOutcome::Stale) => println!("Balance changed while reading, try again"),
        Err(e) => {
            error!("Balance refresh failed: {}", e);
            anyhow::bail!("Balance refresh failed: {}", e);
        }
    }

    Ok(())
}

/// Deposit SOL from the primary wallet into the sniper wallet
pub async fn wallet_deposit(config: &Config, amount: &str, force: bool) -> Result<()> {
    let services = Services::build(config)?;
    services.connect_primary(config)?;
    let Some(sniper) = load_sniper(&services).await? else {
        anyhow::bail!("No sniper wallet. Create one with: sob wallet generate");
    };

    if !force && !confirm(&format!("Deposit {} SOL to {}?", amount, sniper.public_key))? {
        info!("Deposit cancelled by user");
        return Ok(());
    }

    match services.sniper.deposit(amount).await {
        Ok(ack) => {
            println!("\n=== DEPOSIT SUCCESSFUL ===");
            println!("Amount: {} SOL", ack.amount_sol);
            println!("New balance: {} SOL", ack.new_balance);
            println!("Signature: {}", ack.signature);
            println!("View on Solscan: https://solscan.io/tx/{}", ack.signature);
        }
        Err(e) => {
            error!("Deposit failed: {}", e);
            anyhow::bail!("{}", e);
        }
    }

    Ok(())
}

/// Withdraw SOL from the sniper wallet back to the primary wallet
pub async fn wallet_withdraw(config: &Config, amount: &str, force: bool) -> Result<()> {
    let services = Services::build(config)?;
    services.connect_primary(config)?;
    let Some(sniper) = load_sniper(&services).await? else {
        anyhow::bail!("No sniper wallet. Create one with: sob wallet generate");
    };

    if !force
        && !confirm(&format!(
            "Withdraw {} SOL from {}? This cannot be undone.",
            amount, sniper.public_key
        ))?
    {
        info!("Withdrawal cancelled by user");
        return Ok(());
    }

    match services.sniper.withdraw(amount).await {
        Ok(ack) => {
            println!("\n=== WITHDRAWAL SUCCESSFUL ===");
            println!("Amount: {} SOL", ack.amount_sol);
            println!("Remaining: {} SOL", ack.new_balance);
            println!("Signature: {}", ack.signature);
            println!("View on Solscan: https://solscan.io/tx/{}", ack.signature);
        }
        Err(e) => {
            error!("Withdrawal failed: {}", e);
            anyhow::bail!("{}", e);
        }
    }

    Ok(())
}

async fn load_sniper(services: &Services) -> Result<Option<SniperWallet>> {
    services
        .sniper
        .load_persisted()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load sniper wallet: {}", e))
}

fn print_wallet(wallet: &SniperWallet) {
    println!("Address: {}", wallet.public_key);
    println!("Balance: {:.4} SOL", wallet.balance);
    println!("Initialized: {}", wallet.is_initialized);
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;
    use tempfile::{tempdir, TempDir};

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.rpc.endpoint = "http://127.0.0.1:8899".into();
        config.storage.data_dir = dir.path().join("data").display().to_string();
        config.primary_wallet.keypair_path = None;
        config
    }

    fn write_keypair(dir: &TempDir, keypair: &Keypair) -> String {
        let path = dir.path().join("primary.json");
        std::fs::write(&path, serde_json::to_vec(&keypair.to_bytes().to_vec()).unwrap()).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
        }
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_configured_primary_is_connected() {
        let dir = tempdir().unwrap();
        let keypair = Keypair::new();
        let mut config = config_in(&dir);
        config.primary_wallet.keypair_path = Some(write_keypair(&dir, &keypair));

        let services = Services::build(&config).unwrap();
        assert!(services.connect_configured_primary(&config).unwrap());
        assert_eq!(services.wallet.public_key(), Some(keypair.pubkey()));
    }

    #[tokio::test]
    async fn test_unconfigured_primary_stays_disconnected() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);

        let services = Services::build(&config).unwrap();
        assert!(!services.connect_configured_primary(&config).unwrap());
        assert!(services.wallet.public_key().is_none());
    }

    #[tokio::test]
    async fn test_wallet_status_with_primary_and_no_sniper() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir);
        config.primary_wallet.keypair_path = Some(write_keypair(&dir, &Keypair::new()));

        assert!(wallet_status(&config).await.is_ok());
    }
}
