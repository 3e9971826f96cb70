//! SOL transfer construction
//!
//! Amount parsing, unit conversion and single-instruction transfer transactions.

use solana_sdk::{
    native_token::LAMPORTS_PER_SOL, pubkey::Pubkey, system_instruction, transaction::Transaction,
};
use tracing::debug;

use crate::error::{Error, Result};

/// Parse a user-entered SOL amount
///
/// Accepts only finite, positive numbers that are worth at least one lamport.
pub fn parse_sol_amount(input: &str) -> Result<f64> {
    let amount: f64 = input.trim().parse().map_err(|_| Error::InvalidAmount)?;

    if !amount.is_finite() || amount <= 0.0 || sol_to_lamports(amount) == 0 {
        return Err(Error::InvalidAmount);
    }

    Ok(amount)
}

/// Build an unsigned transfer with `from` as fee payer
pub fn transfer_transaction(from: &Pubkey, to: &Pubkey, amount_lamports: u64) -> Transaction {
    debug!(
        "Building transfer: {} lamports from {} to {}",
        amount_lamports, from, to
    );

    let instruction = system_instruction::transfer(from, to, amount_lamports);
    Transaction::new_with_payer(&[instruction], Some(from))
}

/// Convert SOL to lamports
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
