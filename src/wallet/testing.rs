//! In-memory cluster used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, system_program, transaction::Transaction,
};

use crate::error::{Error, Result};

use super::capability::Connection;

/// Fake connection that applies system transfers to an in-memory ledger
#[derive(Default)]
pub struct FakeConnection {
    balances: Mutex<HashMap<Pubkey, u64>>,
    sent: Mutex<Vec<Transaction>>,
    pub fail_send: AtomicBool,
    pub fail_confirm: AtomicBool,
    pub fail_balance: AtomicBool,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: &Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(*address, lamports);
    }

    pub fn balance_of(&self, address: &Pubkey) -> u64 {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    fn apply_transfers(&self, transaction: &Transaction) -> Result<()> {
        let keys = &transaction.message.account_keys;
        let mut balances = self.balances.lock().unwrap();

        for ix in &transaction.message.instructions {
            if keys[ix.program_id_index as usize] != system_program::id() {
                continue;
            }
            // SystemInstruction::Transfer is variant 2 followed by a u64 amount
            if ix.data.len() != 12 || ix.data[..4] != [2, 0, 0, 0] {
                continue;
            }
            let mut amount = [0u8; 8];
            amount.copy_from_slice(&ix.data[4..12]);
            let lamports = u64::from_le_bytes(amount);

            let from = keys[ix.accounts[0] as usize];
            let to = keys[ix.accounts[1] as usize];

            let from_balance = balances.get(&from).copied().unwrap_or(0);
            if from_balance < lamports {
                return Err(Error::TransactionSend("insufficient funds".into()));
            }
            balances.insert(from, from_balance - lamports);
            *balances.entry(to).or_insert(0) += lamports;
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(Error::Rpc("balance unavailable".into()));
        }
        Ok(self.balance_of(address))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::TransactionSend("user rejected the request".into()));
        }
        if !transaction.is_signed() {
            return Err(Error::TransactionSend("transaction is not signed".into()));
        }
        self.apply_transfers(transaction)?;
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn confirm_transaction(&self, _signature: &Signature) -> Result<()> {
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(Error::TransactionConfirm("blockhash expired".into()));
        }
        Ok(())
    }
}
