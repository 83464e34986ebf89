use log::debug;
use std::collections::HashMap;

use crate::errors::{LedgerError, LedgerResult};
use crate::utils::address_hex;
use crate::Address;

/// Seam to the platform's value-transfer primitive. A call must apply
/// all-or-nothing; an `Err` means no value moved.
pub trait ValueTransfer {
    fn transfer(&mut self, recipient: &Address, amount: u64) -> Result<(), String>;
}

/// Tracks the ledger's pooled funds (airline collateral, premiums, oracle
/// fees) and the withdrawable balance owed to each passenger.
#[derive(Debug, Default)]
pub struct FundLedger {
    /// Everything deposited into the ledger, less completed withdrawals
    pub total_balance: u64,
    passenger_balances: HashMap<Address, u64>,
}

impl FundLedger {
    pub fn new() -> Self {
        FundLedger::default()
    }

    /// Credit pooled funds by exactly `amount`. Rejects rather than wrapping
    /// when the pool total would overflow.
    pub fn add_funds(&mut self, amount: u64) -> LedgerResult<()> {
        self.total_balance = self
            .total_balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        Ok(())
    }

    /// Whether the pool can absorb `amount` without overflowing. Callers
    /// that mutate other state before `add_funds` check this first.
    pub fn can_accept(&self, amount: u64) -> bool {
        self.total_balance.checked_add(amount).is_some()
    }

    /// Credit a passenger's withdrawable balance. Liability only; pooled
    /// funds are unchanged until withdrawal. Rejects when the balance would
    /// overflow.
    pub fn credit_passenger(&mut self, passenger: &Address, amount: u64) -> LedgerResult<()> {
        let balance = self
            .passenger_balances
            .entry(passenger.clone())
            .or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        Ok(())
    }

    pub fn balance_of(&self, passenger: &Address) -> u64 {
        self.passenger_balances.get(passenger).copied().unwrap_or(0)
    }

    /// Transfer a passenger's full balance out through `sink`.
    ///
    /// The balance is zeroed strictly before the transfer effect becomes
    /// observable, so a recipient re-invoking the ledger sees nothing left
    /// to withdraw. A sink failure restores the balance and the call
    /// rejects whole.
    pub fn withdraw(
        &mut self,
        passenger: &Address,
        sink: &mut dyn ValueTransfer,
    ) -> LedgerResult<u64> {
        let amount = self.balance_of(passenger);
        if amount == 0 {
            return Err(LedgerError::InsufficientBalance);
        }
        if self.total_balance < amount {
            return Err(LedgerError::TransferFailed(
                "pooled funds below owed balance".to_string(),
            ));
        }

        self.passenger_balances.insert(passenger.clone(), 0);
        if let Err(reason) = sink.transfer(passenger, amount) {
            self.passenger_balances.insert(passenger.clone(), amount);
            return Err(LedgerError::TransferFailed(reason));
        }
        self.total_balance -= amount;
        debug!("passenger {} withdrew {}", address_hex(passenger), amount);
        Ok(amount)
    }
}
