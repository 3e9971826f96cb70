//! Read-only dashboard snapshot
//!
//! Balances, positions and counters are only visible while the primary wallet
//! is connected and the access gate has passed; otherwise they read as zero.

use serde::Serialize;

use crate::access::AccessStatus;
use crate::market::{ActiveSnipe, DashboardTab, MarketState, UserBalances};
use crate::wallet::SniperWallet;

use super::feedback::Feedback;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub connected: bool,
    pub wallet_address: Option<String>,
    pub access: AccessStatus,
    pub data_visible: bool,
    pub balances: UserBalances,
    pub active_snipes: Vec<ActiveSnipe>,
    pub currently_sniping_count: usize,
    pub monitoring_enabled: bool,
    pub total_profit: f64,
    pub active_tab: DashboardTab,
    pub ticker_input: String,
    pub sniper_wallet: Option<SniperWallet>,
    pub processing: bool,
    pub feedback: Option<Feedback>,
}

/// Session facts the view is built from, besides the market state
#[derive(Debug, Clone, Default)]
pub struct SessionFacts {
    pub wallet_address: Option<String>,
    pub access: Option<AccessStatus>,
    pub sniper_wallet: Option<SniperWallet>,
    pub processing: bool,
    pub feedback: Option<Feedback>,
}

impl DashboardView {
    pub fn build(market: &MarketState, facts: SessionFacts) -> Self {
        let connected = facts.wallet_address.is_some();
        let access = facts.access.unwrap_or_else(AccessStatus::denied);
        let data_visible = connected && access.granted;

        let (balances, active_snipes, currently_sniping_count, monitoring_enabled, total_profit) =
            if data_visible {
                (
                    market.balances().clone(),
                    market.snipes().to_vec(),
                    market.currently_sniping_count(),
                    market.is_monitoring(),
                    market.total_profit(),
                )
            } else {
                (UserBalances::default(), Vec::new(), 0, false, 0.0)
            };

        Self {
            connected,
            wallet_address: facts.wallet_address,
            access,
            data_visible,
            balances,
            active_snipes,
            currently_sniping_count,
            monitoring_enabled,
            total_profit,
            active_tab: market.active_tab(),
            ticker_input: market.ticker_input().to_string(),
            sniper_wallet: facts.sniper_wallet,
            processing: facts.processing,
            feedback: facts.feedback,
        }
    }
}
