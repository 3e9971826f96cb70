//! SnipeOnBelieve dashboard backend
//!
//! Sniper wallet custody and funding, a token-gated dashboard session over a
//! simulated market, and the fixture REST API.

pub mod access;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod market;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
