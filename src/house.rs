//! Pooled house liquidity ledger.
//!
//! One long-lived ledger per currency. `balance` is the reserve that matches
//! player wagers 1:1; `fees` is the disjoint pool of accumulated win fees.
//! Every mutation is a fully-applied balance update performed inside the
//! engine's critical section, so no caller can observe a torn state.

use crate::errors::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// House reserve, fee pool and wager policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseLedger {
    balance: u64,
    fees: u64,
    treasury: String,
    fee_bp: u64,
    min_stake: u64,
    max_stake: u64,
}

impl HouseLedger {
    pub fn new(
        treasury: impl Into<String>,
        initial_balance: u64,
        fee_bp: u64,
        min_stake: u64,
        max_stake: u64,
    ) -> Self {
        Self {
            balance: initial_balance,
            fees: 0,
            treasury: treasury.into(),
            fee_bp,
            min_stake,
            max_stake,
        }
    }

    /// Add liquidity to the reserve. Open to anyone.
    pub fn fund(&mut self, amount: u64) -> GameResult<u64> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(self.balance)
    }

    /// Move `amount` out of the reserve into a game's escrow.
    pub fn reserve(&mut self, amount: u64) -> GameResult<()> {
        if amount > self.balance {
            return Err(GameError::InsufficientReserve {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Return escrowed funds to the reserve (loss path, refund house share).
    pub fn credit_balance(&mut self, amount: u64) -> GameResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Add a win fee to the fee pool.
    pub fn credit_fees(&mut self, amount: u64) -> GameResult<()> {
        self.fees = self
            .fees
            .checked_add(amount)
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Drain `amount` from the reserve toward the treasury.
    pub fn withdraw(&mut self, amount: u64) -> GameResult<u64> {
        if amount > self.balance {
            return Err(GameError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    /// Drain the whole fee pool toward the treasury; returns the amount moved.
    pub fn withdraw_all_fees(&mut self) -> u64 {
        std::mem::take(&mut self.fees)
    }

    /// Inclusive wager bounds check.
    pub fn validate_stake(&self, amount: u64) -> GameResult<()> {
        if amount < self.min_stake || amount > self.max_stake {
            return Err(GameError::InvalidStakeAmount {
                amount,
                min: self.min_stake,
                max: self.max_stake,
            });
        }
        Ok(())
    }

    /// Replace the wager policy. `fee_bp` is intentionally not clamped to
    /// 10_000; a larger value makes the win fee swallow the whole stake and
    /// the affected resolution aborts on the payout subtraction.
    pub fn update_config(
        &mut self,
        treasury: impl Into<String>,
        fee_bp: u64,
        min_stake: u64,
        max_stake: u64,
    ) {
        self.treasury = treasury.into();
        self.fee_bp = fee_bp;
        self.min_stake = min_stake;
        self.max_stake = max_stake;
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn fees(&self) -> u64 {
        self.fees
    }

    pub fn treasury(&self) -> &str {
        &self.treasury
    }

    pub fn fee_bp(&self) -> u64 {
        self.fee_bp
    }

    pub fn min_stake(&self) -> u64 {
        self.min_stake
    }

    pub fn max_stake(&self) -> u64 {
        self.max_stake
    }
}
