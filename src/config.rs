//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sniper_wallet: SniperWalletConfig,
    #[serde(default)]
    pub primary_wallet: PrimaryWalletConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub snipe_defaults: SnipeDefaultsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// processed, confirmed or finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Commitment level; unknown names fall back to confirmed
    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }
}

/// Local durable storage for the sniper wallet record and its keystore
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Key-value file holding the public sniper wallet record
    #[serde(default = "default_storage_file")]
    pub storage_file: String,

    /// Key under which the sniper wallet record is stored
    #[serde(default = "default_storage_key")]
    pub sniper_wallet_key: String,

    /// Keystore file holding the sniper wallet secret key
    #[serde(default = "default_keystore_file")]
    pub keystore_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_file: default_storage_file(),
            sniper_wallet_key: default_storage_key(),
            keystore_file: default_keystore_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SniperWalletConfig {
    /// Seconds between balance polls
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for SniperWalletConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

/// The user's primary wallet, standing in for a browser wallet adapter
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryWalletConfig {
    /// Solana CLI keypair file; the wallet starts disconnected when unset
    #[serde(default = "default_keypair_path")]
    pub keypair_path: Option<String>,

    /// Connect on startup when a keypair is available
    #[serde(default = "default_true")]
    pub auto_connect: bool,
}

impl Default for PrimaryWalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
            auto_connect: true,
        }
    }
}

/// Token-gate for dashboard access
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// Skip the on-chain check and grant access to every connected wallet.
    /// On unless explicitly turned off with a gate mint configured.
    #[serde(default = "default_true")]
    pub bypass: bool,

    /// Mint of the gate token
    #[serde(default)]
    pub gate_mint: String,

    /// Minimum UI amount of the gate token
    #[serde(default = "default_minimum_tokens")]
    pub minimum_tokens: f64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            bypass: true,
            gate_mint: String::new(),
            minimum_tokens: default_minimum_tokens(),
        }
    }
}

/// Defaults applied to snipes created from the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct SnipeDefaultsConfig {
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: f64,
    #[serde(default = "default_pool")]
    pub pool: String,
}

impl Default for SnipeDefaultsConfig {
    fn default() -> Self {
        Self {
            slippage_pct: default_slippage_pct(),
            pool: default_pool(),
        }
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_rpc_endpoint() -> String {
    std::env::var("RPC_ENDPOINT").unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".into())
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_commitment() -> String {
    "confirmed".into()
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_storage_file() -> String {
    "local_storage.json".into()
}

fn default_storage_key() -> String {
    "sniperWallet".into()
}

fn default_keystore_file() -> String {
    "sniper-keypair.json".into()
}

fn default_refresh_interval_secs() -> u64 {
    10
}

fn default_keypair_path() -> Option<String> {
    std::env::var("KEYPAIR_PATH").ok()
}

fn default_minimum_tokens() -> f64 {
    100_000.0
}

fn default_slippage_pct() -> f64 {
    15.0
}

fn default_pool() -> String {
    "Believe".into()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("rpc.endpoint", default_rpc_endpoint())?
            .set_default("rpc.timeout_ms", default_timeout_ms() as i64)?
            .set_default("rpc.commitment", default_commitment())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SOB__)
            .add_source(
                config::Environment::with_prefix("SOB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sniper_wallet.refresh_interval_secs == 0 {
            anyhow::bail!("sniper_wallet.refresh_interval_secs must be positive");
        }

        if !matches!(
            self.rpc.commitment.as_str(),
            "processed" | "confirmed" | "finalized"
        ) {
            anyhow::bail!(
                "rpc.commitment must be processed, confirmed or finalized, got {}",
                self.rpc.commitment
            );
        }

        if self.storage.sniper_wallet_key.trim().is_empty() {
            anyhow::bail!("storage.sniper_wallet_key cannot be empty");
        }

        if self.storage.storage_file == self.storage.keystore_file {
            anyhow::bail!("storage.storage_file and storage.keystore_file must differ");
        }

        if !(0.0..=100.0).contains(&self.snipe_defaults.slippage_pct) {
            anyhow::bail!("snipe_defaults.slippage_pct must be between 0 and 100");
        }

        if !self.access.bypass {
            if self.access.gate_mint.len() < 32 || self.access.gate_mint.len() > 44 {
                anyhow::bail!(
                    "access.gate_mint must be a mint address (or set access.bypass = true)"
                );
            }
            if self.access.minimum_tokens < 0.0 {
                anyhow::bail!("access.minimum_tokens cannot be negative");
            }
        }

        if self.access.bypass {
            tracing::warn!("Access gate bypassed - every connected wallet can use the dashboard");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Server:
    bind_addr: {}
  RPC:
    endpoint: {}
    timeout: {}ms
    commitment: {}
  Storage:
    data_dir: {}
    storage_file: {}
    sniper_wallet_key: {}
    keystore_file: {}
  Sniper wallet:
    refresh_interval: {}s
  Primary wallet:
    keypair_path: {}
    auto_connect: {}
  Access:
    bypass: {}
    gate_mint: {}
    minimum_tokens: {}
  Snipe defaults:
    slippage: {}%
    pool: {}
"#,
            self.server.bind_addr,
            mask_url(&self.rpc.endpoint),
            self.rpc.timeout_ms,
            self.rpc.commitment,
            self.storage.data_dir,
            self.storage.storage_file,
            self.storage.sniper_wallet_key,
            self.storage.keystore_file,
            self.sniper_wallet.refresh_interval_secs,
            if self.primary_wallet.keypair_path.is_some() {
                "***"
            } else {
                "(not set)"
            },
            self.primary_wallet.auto_connect,
            self.access.bypass,
            if self.access.gate_mint.is_empty() {
                "(not set)"
            } else {
                self.access.gate_mint.as_str()
            },
            self.access.minimum_tokens,
            self.snipe_defaults.slippage_pct,
            self.snipe_defaults.pool,
        )
    }

    /// Path of the key-value storage file
    pub fn storage_path(&self) -> std::path::PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.storage_file)
    }

    /// Path of the sniper keystore file
    pub fn keystore_path(&self) -> std::path::PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.keystore_file)
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rpc: RpcConfig {
                endpoint: default_rpc_endpoint(),
                timeout_ms: default_timeout_ms(),
                commitment: default_commitment(),
            },
            storage: StorageConfig::default(),
            sniper_wallet: SniperWalletConfig::default(),
            primary_wallet: PrimaryWalletConfig::default(),
            access: AccessConfig::default(),
            snipe_defaults: SnipeDefaultsConfig::default(),
        }
    }
}
