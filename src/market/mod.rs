//! Simulated market module
//!
//! Static token catalogs plus the per-session state machine for snipe jobs and
//! positions. No network I/O happens here.

pub mod catalog;
pub mod state;
pub mod types;

pub use state::MarketState;
pub use types::{
    ActiveSnipe, DashboardTab, GraduatedToken, Priority, RealizedSale, SnipeStatus, SnipeType,
    TokenListing, TokenPosition, UserBalances,
};
