//! Token-gated dashboard access
//!
//! A wallet may use the dashboard once it holds a minimum amount of the gate
//! token. The check runs on connect and on every account change.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, info};

use crate::config::AccessConfig;
use crate::error::{Error, Result};

/// Source of gate-token balances
#[async_trait]
pub trait TokenBalanceOracle: Send + Sync {
    /// Gate-token balance of `wallet` in UI units
    async fn token_balance(&self, wallet: &Pubkey) -> Result<f64>;

    /// Minimum balance required for access
    fn minimum(&self) -> f64;

    async fn has_minimum_tokens(&self, wallet: &Pubkey) -> Result<bool> {
        Ok(self.access_status(wallet).await?.granted)
    }

    async fn additional_tokens_needed(&self, wallet: &Pubkey) -> Result<f64> {
        Ok(self.access_status(wallet).await?.additional_tokens_needed)
    }

    /// Grant and shortfall derived from a single balance read
    async fn access_status(&self, wallet: &Pubkey) -> Result<AccessStatus> {
        let balance = self.token_balance(wallet).await?;
        Ok(AccessStatus::from_balance(balance, self.minimum()))
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
    pub granted: bool,
    pub additional_tokens_needed: f64,
}

impl AccessStatus {
    pub fn from_balance(balance: f64, minimum: f64) -> Self {
        let granted = balance >= minimum;
        Self {
            granted,
            additional_tokens_needed: if granted { 0.0 } else { (minimum - balance).max(0.0) },
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            additional_tokens_needed: 0.0,
        }
    }
}

/// Run the gate check for `wallet`
pub async fn check_access(oracle: &dyn TokenBalanceOracle, wallet: &Pubkey) -> Result<AccessStatus> {
    let status = oracle.access_status(wallet).await?;

    info!(
        "Access check for {}: granted={}, additional_needed={}",
        wallet, status.granted, status.additional_tokens_needed
    );

    Ok(status)
}

/// Reads the wallet's associated token account for the gate mint
pub struct SplTokenOracle {
    client: Arc<RpcClient>,
    mint: Pubkey,
    minimum: f64,
}

impl SplTokenOracle {
    pub fn new(client: Arc<RpcClient>, mint: Pubkey, minimum: f64) -> Self {
        Self {
            client,
            mint,
            minimum,
        }
    }
}

#[async_trait]
impl TokenBalanceOracle for SplTokenOracle {
    async fn token_balance(&self, wallet: &Pubkey) -> Result<f64> {
        let token_account = get_associated_token_address(wallet, &self.mint);

        let account = self
            .client
            .get_account_with_commitment(&token_account, self.client.commitment())
            .await?
            .value;
        if account.is_none() {
            debug!("{} has no token account for {}", wallet, self.mint);
            return Ok(0.0);
        }

        let amount = self.client.get_token_account_balance(&token_account).await?;
        match amount.ui_amount {
            Some(ui_amount) => Ok(ui_amount),
            None => amount.ui_amount_string.parse().map_err(|_| {
                Error::Rpc(format!(
                    "Unreadable token amount for {}: {}",
                    token_account, amount.ui_amount_string
                ))
            }),
        }
    }

    fn minimum(&self) -> f64 {
        self.minimum
    }
}

/// Grants access to every wallet
pub struct AlwaysGrantOracle;

#[async_trait]
impl TokenBalanceOracle for AlwaysGrantOracle {
    async fn token_balance(&self, _wallet: &Pubkey) -> Result<f64> {
        Ok(0.0)
    }

    fn minimum(&self) -> f64 {
        0.0
    }

    async fn access_status(&self, _wallet: &Pubkey) -> Result<AccessStatus> {
        Ok(AccessStatus {
            granted: true,
            additional_tokens_needed: 0.0,
        })
    }
}

/// Build the oracle described by `config`
pub fn oracle_from_config(
    config: &AccessConfig,
    client: Arc<RpcClient>,
) -> Result<Arc<dyn TokenBalanceOracle>> {
    if config.bypass {
        return Ok(Arc::new(AlwaysGrantOracle));
    }

    let mint: Pubkey = config
        .gate_mint
        .parse()
        .map_err(|e| Error::Config(format!("Invalid gate mint {}: {}", config.gate_mint, e)))?;
    Ok(Arc::new(SplTokenOracle::new(
        client,
        mint,
        config.minimum_tokens,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBalance {
        balance: f64,
        minimum: f64,
    }

    #[async_trait]
    impl TokenBalanceOracle for FixedBalance {
        async fn token_balance(&self, _wallet: &Pubkey) -> Result<f64> {
            Ok(self.balance)
        }

        fn minimum(&self) -> f64 {
            self.minimum
        }
    }

    #[tokio::test]
    async fn test_below_minimum_reports_shortfall() {
        let oracle = FixedBalance {
            balance: 40_000.0,
            minimum: 100_000.0,
        };
        let wallet = Pubkey::new_unique();
        let status = check_access(&oracle, &wallet).await.unwrap();
        assert!(!status.granted);
        assert_eq!(status.additional_tokens_needed, 60_000.0);

        assert!(!oracle.has_minimum_tokens(&wallet).await.unwrap());
        assert_eq!(oracle.additional_tokens_needed(&wallet).await.unwrap(), 60_000.0);
    }

    /// Each read returns a larger balance
    struct RisingBalance {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl TokenBalanceOracle for RisingBalance {
        async fn token_balance(&self, _wallet: &Pubkey) -> Result<f64> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(10.0 + 50.0 * n as f64)
        }

        fn minimum(&self) -> f64 {
            100.0
        }
    }

    #[tokio::test]
    async fn test_denied_check_reads_balance_once() {
        let oracle = RisingBalance {
            reads: AtomicUsize::new(0),
        };
        let status = check_access(&oracle, &Pubkey::new_unique()).await.unwrap();
        assert_eq!(oracle.reads.load(Ordering::SeqCst), 1);
        assert!(!status.granted);
        assert_eq!(status.additional_tokens_needed, 90.0);
    }

    #[tokio::test]
    async fn test_at_minimum_is_granted() {
        let oracle = FixedBalance {
            balance: 100_000.0,
            minimum: 100_000.0,
        };
        let status = check_access(&oracle, &Pubkey::new_unique()).await.unwrap();
        assert!(status.granted);
        assert_eq!(status.additional_tokens_needed, 0.0);
    }

    #[tokio::test]
    async fn test_always_grant() {
        let wallet = Pubkey::new_unique();
        let status = check_access(&AlwaysGrantOracle, &wallet).await.unwrap();
        assert!(status.granted);
        assert!(AlwaysGrantOracle.has_minimum_tokens(&wallet).await.unwrap());
        assert_eq!(AlwaysGrantOracle.additional_tokens_needed(&wallet).await.unwrap(), 0.0);
    }

    #[test]
    fn test_oracle_from_config_rejects_bad_mint() {
        let client = Arc::new(RpcClient::new("http://127.0.0.1:8899".into()));
        let config = AccessConfig {
            bypass: false,
            gate_mint: "not-a-mint".into(),
            minimum_tokens: 1.0,
        };
        assert!(matches!(
            oracle_from_config(&config, client),
            Err(Error::Config(_))
        ));
    }
}
