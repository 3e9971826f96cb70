//! Simulated market state
//!
//! Snipe jobs, positions and the realized-sale ledger of one dashboard session,
//! mutated only by user actions. Nothing here advances on its own: a snipe
//! keeps the status it was created with until it is cancelled.
//!
//! Counters are derived from the collections on read, never tracked by hand.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::AccessStatus;
use crate::config::SnipeDefaultsConfig;
use crate::error::{Error, Result};

use super::catalog;
use super::types::{
    ActiveSnipe, DashboardTab, GraduatedToken, Priority, RealizedSale, SnipeStatus, SnipeType,
    TokenListing, TokenPosition, UserBalances,
};

pub const MISSING_HANDLE: &str = "Please enter an X account handle";
pub const MISSING_TICKER: &str = "Please enter a token ticker or name";
pub const INVALID_SNIPE_AMOUNT: &str = "Please enter a valid amount to snipe";

const JUST_NOW: &str = "Just now";

/// In-memory market state for one dashboard session
#[derive(Debug, Clone)]
pub struct MarketState {
    tokens: Vec<TokenListing>,
    graduated: Vec<GraduatedToken>,
    snipes: Vec<ActiveSnipe>,
    balances: UserBalances,
    realized: Vec<RealizedSale>,
    active_tab: DashboardTab,
    ticker_input: String,
    monitoring_enabled: bool,
    defaults: SnipeDefaultsConfig,
}

impl MarketState {
    pub fn new(defaults: SnipeDefaultsConfig) -> Self {
        Self {
            tokens: catalog::token_listings(),
            graduated: catalog::graduated_tokens(),
            snipes: Vec::new(),
            balances: UserBalances::default(),
            realized: Vec::new(),
            active_tab: DashboardTab::default(),
            ticker_input: String::new(),
            monitoring_enabled: false,
            defaults,
        }
    }

    /// Start monitoring an X account for new launches
    pub fn enable_monitoring(&mut self, handle: &str, amount: &str) -> Result<ActiveSnipe> {
        let handle = handle.trim().trim_start_matches('@').trim();
        if handle.is_empty() {
            return Err(Error::Validation(MISSING_HANDLE.into()));
        }
        let amount = parse_snipe_amount(amount)?;

        let snipe = self.push_snipe(
            format!("@{}", handle),
            SnipeType::XAccount,
            amount,
            SnipeStatus::Monitoring,
            Priority::High,
        );
        self.monitoring_enabled = true;
        info!("Monitoring {} with {} SOL", snipe.target, amount);
        Ok(snipe)
    }

    /// Queue a snipe on a specific ticker or token name
    pub fn set_direct_snipe(&mut self, ticker: &str, amount: &str) -> Result<ActiveSnipe> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(Error::Validation(MISSING_TICKER.into()));
        }
        let amount = parse_snipe_amount(amount)?;

        let snipe = self.push_snipe(
            ticker.to_string(),
            SnipeType::DirectSnipe,
            amount,
            SnipeStatus::Pending,
            Priority::Medium,
        );
        info!("Direct snipe set on {} with {} SOL", snipe.target, amount);
        Ok(snipe)
    }

    /// Jump to the configuration tab with the ticker of a catalog row filled in
    ///
    /// Returns the ticker, or `None` when no catalog token has that name.
    pub fn snipe_from_catalog(&mut self, name: &str) -> Option<String> {
        let ticker = self
            .tokens
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.ticker.clone())
            .or_else(|| {
                self.graduated
                    .iter()
                    .find(|t| t.name == name)
                    .map(|t| t.ticker.clone())
            })?;

        self.active_tab = DashboardTab::SniperConfig;
        self.ticker_input = ticker.clone();
        Some(ticker)
    }

    /// Remove a snipe by id
    pub fn cancel_snipe(&mut self, id: Uuid) -> Option<ActiveSnipe> {
        let index = self.snipes.iter().position(|s| s.id == id)?;
        Some(self.remove_snipe(index))
    }

    /// Remove the first snipe whose target matches
    pub fn cancel_snipe_by_target(&mut self, target: &str) -> Option<ActiveSnipe> {
        let index = self.snipes.iter().position(|s| s.target == target)?;
        Some(self.remove_snipe(index))
    }

    /// Sell a position by id, realizing its profit
    pub fn sell_position(&mut self, id: Uuid) -> Option<RealizedSale> {
        let index = self.balances.positions.iter().position(|p| p.id == id)?;
        Some(self.realize(index))
    }

    /// Sell the first position in `token`
    pub fn sell_position_by_token(&mut self, token: &str) -> Option<RealizedSale> {
        let index = self
            .balances
            .positions
            .iter()
            .position(|p| p.token == token)?;
        Some(self.realize(index))
    }

    /// Seed demo balances on a granted check, clear them otherwise
    ///
    /// Either way the realized-sale ledger restarts with the new balances.
    pub fn apply_access(&mut self, status: &AccessStatus) {
        self.balances = if status.granted {
            catalog::demo_balances()
        } else {
            UserBalances::default()
        };
        self.realized.clear();
        debug!(
            "Balances replaced after access check (granted={})",
            status.granted
        );
    }

    pub fn set_active_tab(&mut self, tab: DashboardTab) {
        self.active_tab = tab;
    }

    pub fn snipes(&self) -> &[ActiveSnipe] {
        &self.snipes
    }

    pub fn balances(&self) -> &UserBalances {
        &self.balances
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active_tab
    }

    pub fn ticker_input(&self) -> &str {
        &self.ticker_input
    }

    pub fn currently_sniping_count(&self) -> usize {
        self.snipes.len()
    }

    /// Set by the first accepted monitor request; cancelling snipes leaves it on
    pub fn is_monitoring(&self) -> bool {
        self.monitoring_enabled
    }

    /// Sum of realized profit in SOL
    pub fn total_profit(&self) -> f64 {
        self.realized.iter().map(|s| s.profit_value).sum()
    }

    fn push_snipe(
        &mut self,
        target: String,
        snipe_type: SnipeType,
        amount: f64,
        status: SnipeStatus,
        priority: Priority,
    ) -> ActiveSnipe {
        let snipe = ActiveSnipe {
            id: Uuid::new_v4(),
            target,
            snipe_type,
            amount: format!("{} SOL", amount),
            slippage: format!("{}%", self.defaults.slippage_pct),
            status,
            created: JUST_NOW.into(),
            priority,
            pool: self.defaults.pool.clone(),
        };
        self.snipes.push(snipe.clone());
        snipe
    }

    fn remove_snipe(&mut self, index: usize) -> ActiveSnipe {
        let snipe = self.snipes.remove(index);
        info!("Cancelled snipe on {}", snipe.target);
        snipe
    }

    fn realize(&mut self, index: usize) -> RealizedSale {
        let position: TokenPosition = self.balances.positions.remove(index);
        let sale = RealizedSale {
            position_id: position.id,
            token: position.token,
            profit_value: position.profit_value,
            sold_at: Utc::now(),
        };
        info!(
            "Sold {} position, realized {:+} SOL",
            sale.token, sale.profit_value
        );
        self.realized.push(sale.clone());
        sale
    }
}

/// Snipe amounts only need to be positive; no transfer is built from them
fn parse_snipe_amount(amount: &str) -> Result<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| Error::Validation(INVALID_SNIPE_AMOUNT.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MarketState {
        MarketState::new(SnipeDefaultsConfig::default())
    }

    fn granted() -> AccessStatus {
        AccessStatus {
            granted: true,
            additional_tokens_needed: 0.0,
        }
    }

    fn validation_message(result: Result<ActiveSnipe>) -> String {
        match result {
            Err(Error::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_monitoring_requires_handle() {
        let mut state = state();
        let message = validation_message(state.enable_monitoring("", "1"));
        assert_eq!(message, "Please enter an X account handle");
        assert!(state.snipes().is_empty());

        let message = validation_message(state.enable_monitoring("  @ ", "1"));
        assert_eq!(message, MISSING_HANDLE);
    }

    #[test]
    fn test_monitoring_requires_positive_amount() {
        let mut state = state();
        let message = validation_message(state.enable_monitoring("abc", "0"));
        assert_eq!(message, "Please enter a valid amount to snipe");
        assert!(state.snipes().is_empty());
        assert_eq!(state.currently_sniping_count(), 0);
    }

    #[test]
    fn test_monitoring_appends_snipe() {
        let mut state = state();
        let snipe = state.enable_monitoring("abc", "1").unwrap();

        assert_eq!(state.snipes().len(), 1);
        assert_eq!(snipe.target, "@abc");
        assert_eq!(snipe.snipe_type, SnipeType::XAccount);
        assert_eq!(snipe.status, SnipeStatus::Monitoring);
        assert_eq!(snipe.created, "Just now");
        assert_eq!(snipe.amount, "1 SOL");
        assert_eq!(state.currently_sniping_count(), 1);
        assert!(state.is_monitoring());

        // A leading @ is not doubled
        assert_eq!(state.enable_monitoring("@abc", "1").unwrap().target, "@abc");
    }

    #[test]
    fn test_sub_lamport_snipe_amount_accepted() {
        let mut state = state();
        let snipe = state.enable_monitoring("abc", "0.0000000001").unwrap();
        assert_eq!(snipe.amount, format!("{} SOL", 0.0000000001_f64));
        assert!(state.set_direct_snipe("BLVAI", "1e-12").is_ok());

        for bad in ["abc", "NaN", "inf", "-0.5", ""] {
            let message = validation_message(state.set_direct_snipe("BLVAI", bad));
            assert_eq!(message, INVALID_SNIPE_AMOUNT, "input {:?}", bad);
        }
        assert_eq!(state.currently_sniping_count(), 2);
    }

    #[test]
    fn test_monitoring_latch_survives_cancel() {
        let mut state = state();
        assert!(!state.is_monitoring());

        let snipe = state.enable_monitoring("abc", "1").unwrap();
        state.cancel_snipe(snipe.id).unwrap();
        assert_eq!(state.currently_sniping_count(), 0);
        assert!(state.is_monitoring());

        // A rejected request does not turn it on
        let mut fresh = MarketState::new(SnipeDefaultsConfig::default());
        assert!(fresh.enable_monitoring("abc", "0").is_err());
        assert!(!fresh.is_monitoring());
    }

    #[test]
    fn test_direct_snipe() {
        let mut state = state();
        let message = validation_message(state.set_direct_snipe(" ", "1"));
        assert_eq!(message, MISSING_TICKER);
        let message = validation_message(state.set_direct_snipe("BLVAI", "-2"));
        assert_eq!(message, INVALID_SNIPE_AMOUNT);

        let snipe = state.set_direct_snipe("BLVAI", "0.5").unwrap();
        assert_eq!(snipe.snipe_type, SnipeType::DirectSnipe);
        assert_eq!(snipe.status, SnipeStatus::Pending);
        assert_eq!(snipe.priority, Priority::Medium);
        assert_eq!(state.currently_sniping_count(), 1);
        assert!(!state.is_monitoring());
    }

    #[test]
    fn test_snipes_keep_insertion_order() {
        let mut state = state();
        state.enable_monitoring("first", "1").unwrap();
        state.set_direct_snipe("SECOND", "1").unwrap();
        state.enable_monitoring("third", "1").unwrap();

        let targets: Vec<&str> = state.snipes().iter().map(|s| s.target.as_str()).collect();
        assert_eq!(targets, vec!["@first", "SECOND", "@third"]);

        state.cancel_snipe_by_target("SECOND");
        let targets: Vec<&str> = state.snipes().iter().map(|s| s.target.as_str()).collect();
        assert_eq!(targets, vec!["@first", "@third"]);
    }

    #[test]
    fn test_cancel_by_target_removes_one() {
        let mut state = state();
        state.enable_monitoring("abc", "1").unwrap();
        state.enable_monitoring("abc", "2").unwrap();

        assert!(state.cancel_snipe_by_target("@abc").is_some());
        assert_eq!(state.currently_sniping_count(), 1);
        assert!(state.cancel_snipe_by_target("@abc").is_some());
        assert_eq!(state.currently_sniping_count(), 0);

        // Nothing left: no-op, count stays at zero
        assert!(state.cancel_snipe_by_target("@abc").is_none());
        assert_eq!(state.currently_sniping_count(), 0);
    }

    #[test]
    fn test_cancel_by_id_disambiguates() {
        let mut state = state();
        let first = state.enable_monitoring("abc", "1").unwrap();
        let second = state.enable_monitoring("abc", "2").unwrap();

        let cancelled = state.cancel_snipe(second.id).unwrap();
        assert_eq!(cancelled.amount, "2 SOL");
        assert_eq!(state.snipes()[0].id, first.id);
        assert!(state.cancel_snipe(second.id).is_none());
    }

    #[test]
    fn test_snipe_from_catalog() {
        let mut state = state();
        assert_eq!(state.snipe_from_catalog("Believe AI").as_deref(), Some("BLVAI"));
        assert_eq!(state.active_tab(), DashboardTab::SniperConfig);
        assert_eq!(state.ticker_input(), "BLVAI");
        assert!(state.snipes().is_empty());

        state.set_active_tab(DashboardTab::Positions);
        assert_eq!(state.snipe_from_catalog("Nope"), None);
        assert_eq!(state.active_tab(), DashboardTab::Positions);
        assert_eq!(state.ticker_input(), "BLVAI");
    }

    #[test]
    fn test_sell_realizes_profit_once() {
        let mut state = state();
        state.apply_access(&granted());
        let before = state.balances().positions.len();

        let sale = state.sell_position_by_token("BelieverCoin").unwrap();
        assert_eq!(sale.profit_value, 1.25);
        assert_eq!(state.balances().positions.len(), before - 1);
        assert!((state.total_profit() - 1.25).abs() < 1e-9);

        assert!(state.sell_position_by_token("BelieverCoin").is_none());
        assert!((state.total_profit() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_losses_reduce_total_profit() {
        let mut state = state();
        state.apply_access(&granted());

        let id = state
            .balances()
            .positions
            .iter()
            .find(|p| p.token == "Pump Republic")
            .unwrap()
            .id;
        state.sell_position(id).unwrap();
        assert!((state.total_profit() + 0.16).abs() < 1e-9);
    }

    #[test]
    fn test_denied_access_clears_balances() {
        let mut state = state();
        state.apply_access(&granted());
        state.sell_position_by_token("BelieverCoin");

        state.apply_access(&AccessStatus::denied());
        assert_eq!(state.balances(), &UserBalances::default());
        assert_eq!(state.total_profit(), 0.0);
    }
}
