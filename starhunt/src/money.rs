use ahash::HashMap;
use thiserror::Error;
use crate::PlayerId;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum LedgerError {
    #[error("amount must be greater than zero")]
    InvalidAmount,
}

/// Per-player accounts. Balances never go below zero: an overdrawing withdrawal is refused.
#[derive(Clone, Debug)]
pub struct Ledger {
    starting_balance: u32,
    balances: HashMap<PlayerId, u32>,
}

impl Ledger {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            starting_balance,
            balances: Default::default(),
        }
    }

    pub fn starting_balance(&self) -> u32 {
        self.starting_balance
    }

    /// Opens an account at the starting balance. Re-opening resets rather than merges.
    pub fn open(&mut self, player_id: PlayerId) {
        self.balances.insert(player_id, self.starting_balance);
    }

    pub fn is_open(&self, player_id: PlayerId) -> bool {
        self.balances.contains_key(&player_id)
    }

    pub fn balance_of(&self, player_id: PlayerId) -> u32 {
        self.balances.get(&player_id).copied().unwrap_or(0)
    }

    pub fn deposit(&mut self, player_id: PlayerId, amount: u32) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let balance = self.balances.entry(player_id).or_insert(0);
        *balance = balance.saturating_add(amount);

        Ok(())
    }

    /// Returns `Ok(false)` without touching the balance if `amount` exceeds it.
    pub fn withdraw(&mut self, player_id: PlayerId, amount: u32) -> Result<bool, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let amount_available = self.balance_of(player_id);

        if amount > amount_available {
            return Ok(false);
        }

        self.balances.insert(player_id, amount_available - amount);

        Ok(true)
    }
}
