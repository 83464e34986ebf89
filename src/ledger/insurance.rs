use log::info;
use std::collections::HashMap;

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::flights::FlightKey;
use crate::ledger::funds::FundLedger;
use crate::utils::address_hex;
use crate::Address;

/// Policies sold against a single flight, plus the flight's premium pool.
#[derive(Debug, Clone, Default)]
pub struct PolicyBook {
    /// Premium paid per passenger
    pub policies: HashMap<Address, u64>,
    /// Purchase order, kept for stable enumeration
    pub order: Vec<Address>,
    /// Sum of premiums collected on this flight
    pub premium_pool: u64,
    /// Guard: payouts for this flight have been credited
    pub paid_out: bool,
}

/// Per-flight passenger policies and payout computation.
///
/// A passenger holds at most one policy per flight; a second purchase is
/// rejected outright rather than accumulated.
#[derive(Debug, Default)]
pub struct InsuranceEscrow {
    books: HashMap<FlightKey, PolicyBook>,
}

impl InsuranceEscrow {
    pub fn new() -> Self {
        InsuranceEscrow::default()
    }

    /// Record a policy. The flight's existence is the caller's precondition;
    /// value bounds and the one-policy rule are enforced here.
    pub fn purchase(
        &mut self,
        key: &FlightKey,
        passenger: &Address,
        amount: u64,
        config: &LedgerConfig,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > config.max_insurance_value {
            return Err(LedgerError::ExceedsCap);
        }
        let book = self.books.entry(key.clone()).or_default();
        if book.policies.contains_key(passenger) {
            return Err(LedgerError::DuplicatePolicy);
        }
        let premium_pool = book
            .premium_pool
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        book.policies.insert(passenger.clone(), amount);
        book.order.push(passenger.clone());
        book.premium_pool = premium_pool;
        Ok(())
    }

    /// Credit every policy-holder on the flight with the configured payout
    /// multiple of their premium. At most once per flight; repeat calls
    /// credit zero. Returns the total credited.
    ///
    /// The whole batch is validated before anyone is credited: if any payout
    /// would overflow, the call rejects with no balance touched and the
    /// flight stays uncredited.
    pub fn credit_payouts(
        &mut self,
        key: &FlightKey,
        config: &LedgerConfig,
        funds: &mut FundLedger,
    ) -> LedgerResult<u64> {
        let Some(book) = self.books.get_mut(key) else {
            return Ok(0);
        };
        if book.paid_out {
            return Ok(0);
        }

        let mut payouts = Vec::with_capacity(book.order.len());
        let mut credited = 0u64;
        for passenger in &book.order {
            let premium = book.policies[passenger];
            let payout = config
                .payout_for(premium)
                .ok_or(LedgerError::InvalidAmount)?;
            funds
                .balance_of(passenger)
                .checked_add(payout)
                .ok_or(LedgerError::InvalidAmount)?;
            credited = credited
                .checked_add(payout)
                .ok_or(LedgerError::InvalidAmount)?;
            payouts.push((passenger.clone(), payout));
        }

        book.paid_out = true;
        for (passenger, payout) in &payouts {
            funds.credit_passenger(passenger, *payout)?;
        }
        info!(
            "credited {} across {} policies on flight {} of airline {}",
            credited,
            book.order.len(),
            key.flight_code,
            address_hex(&key.airline)
        );
        Ok(credited)
    }

    pub fn passengers_count(&self, key: &FlightKey) -> usize {
        self.books.get(key).map_or(0, |b| b.order.len())
    }

    pub fn passenger_insurance_value(&self, key: &FlightKey, passenger: &Address) -> u64 {
        self.books
            .get(key)
            .and_then(|b| b.policies.get(passenger))
            .copied()
            .unwrap_or(0)
    }

    pub fn premium_pool(&self, key: &FlightKey) -> u64 {
        self.books.get(key).map_or(0, |b| b.premium_pool)
    }
}
