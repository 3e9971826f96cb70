//! Market data types shared by the catalog, the dashboard state and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newly launched token shown in the discovery table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListing {
    pub name: String,
    pub ticker: String,
    pub market_cap: String,
    pub contract_age: String,
    pub holders: u32,
    pub x_followers: String,
    pub liquidity: String,
    pub pool: String,
    pub deployed_by: String,
    pub pair_created: String,
}

/// Token that completed its bonding curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduatedToken {
    pub name: String,
    pub ticker: String,
    pub market_cap: String,
    pub price: String,
    pub change: String,
    pub volume: String,
    pub tx_count: u32,
    pub pool: String,
    pub deployed_by: String,
}

/// What a snipe job is watching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnipeType {
    /// Buy the next token launched by an X account
    #[serde(rename = "X Account")]
    XAccount,

    /// Buy a specific ticker or name as soon as it appears
    #[serde(rename = "Direct Snipe")]
    DirectSnipe,
}

impl std::fmt::Display for SnipeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnipeType::XAccount => write!(f, "X Account"),
            SnipeType::DirectSnipe => write!(f, "Direct Snipe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnipeStatus {
    Monitoring,
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A configured snipe job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSnipe {
    pub id: Uuid,
    pub target: String,
    #[serde(rename = "type")]
    pub snipe_type: SnipeType,
    pub amount: String,
    pub slippage: String,
    pub status: SnipeStatus,
    pub created: String,
    pub priority: Priority,
    pub pool: String,
}

/// An open token position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPosition {
    pub id: Uuid,
    pub token: String,
    pub ticker: String,
    pub amount: String,
    pub value: String,
    pub buy_price: String,
    pub current_price: String,
    /// Signed percentage
    pub profit: f64,
    /// Signed SOL amount
    pub profit_value: f64,
}

/// Balances shown on the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalances {
    pub sol: String,
    pub sob: String,
    pub positions: Vec<TokenPosition>,
}

impl Default for UserBalances {
    fn default() -> Self {
        Self {
            sol: "0".into(),
            sob: "0".into(),
            positions: Vec::new(),
        }
    }
}

/// A sold position; the ledger of these is the source of total profit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedSale {
    pub position_id: Uuid,
    pub token: String,
    pub profit_value: f64,
    pub sold_at: DateTime<Utc>,
}

/// Dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardTab {
    #[default]
    NewTokens,
    Graduated,
    SniperConfig,
    ActiveSnipes,
    Positions,
    Wallet,
}
