use log::info;
use std::collections::{HashMap, HashSet};

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, LedgerResult};
use crate::utils::address_hex;
use crate::Address;

/// A member airline, or a candidate still accumulating admission votes.
#[derive(Debug, Clone, Default)]
pub struct Airline {
    pub is_registered: bool,
    /// Collateral deposited so far
    pub deposited_value: u64,
    /// Distinct member airlines that voted for this candidate
    pub votes: HashSet<Address>,
}

/// Outcome of a `register` call, reported back so the caller can emit the
/// matching event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Candidate is now a registered member; `votes` is the final tally
    /// (zero for direct admissions).
    Admitted { votes: usize },
    /// Vote recorded, threshold not yet reached.
    Voted { votes: usize },
    /// The requester had already voted; the tally is unchanged.
    AlreadyVoted { votes: usize },
}

/// Membership set plus pending-vote tallies for candidates.
///
/// The first `direct_admission_limit` airlines are admitted without a vote.
/// Past that point a candidate joins once the votes of distinct members
/// satisfy `votes * 2 >= registered_count`, evaluated against the member
/// count at the instant the threshold-crossing vote lands. Registration is
/// permanent.
#[derive(Debug, Default)]
pub struct AirlineRegistry {
    pub airlines: HashMap<Address, Airline>,
    registered_count: usize,
}

impl AirlineRegistry {
    /// Create the registry with its founding airline already admitted.
    pub fn bootstrap(first_airline: Address) -> Self {
        let mut registry = AirlineRegistry::default();
        registry.airlines.insert(
            first_airline,
            Airline {
                is_registered: true,
                ..Airline::default()
            },
        );
        registry.registered_count = 1;
        registry
    }

    /// Admit a candidate directly or record the requester's vote.
    ///
    /// Requires the requester to be a registered airline with collateral at
    /// or above the funding threshold. Re-voting by the same requester is a
    /// no-op, not an error.
    pub fn register(
        &mut self,
        requester: &Address,
        candidate: &Address,
        config: &LedgerConfig,
    ) -> LedgerResult<AdmissionOutcome> {
        if !self.is_funded(requester, config) {
            return Err(LedgerError::Unauthorized);
        }
        if self.is_airline(candidate) {
            return Err(LedgerError::AlreadyRegistered);
        }

        if self.registered_count < config.direct_admission_limit {
            let entry = self.airlines.entry(candidate.clone()).or_default();
            entry.is_registered = true;
            self.registered_count += 1;
            info!(
                "airline {} admitted directly ({} registered)",
                address_hex(candidate),
                self.registered_count
            );
            return Ok(AdmissionOutcome::Admitted { votes: 0 });
        }

        // Tally against the member count as of this call.
        let member_count = self.registered_count;
        let entry = self.airlines.entry(candidate.clone()).or_default();
        if !entry.votes.insert(requester.clone()) {
            return Ok(AdmissionOutcome::AlreadyVoted {
                votes: entry.votes.len(),
            });
        }

        let votes = entry.votes.len();
        if votes * 2 >= member_count {
            entry.is_registered = true;
            self.registered_count += 1;
            info!(
                "airline {} admitted with {} votes ({} registered)",
                address_hex(candidate),
                votes,
                self.registered_count
            );
            Ok(AdmissionOutcome::Admitted { votes })
        } else {
            Ok(AdmissionOutcome::Voted { votes })
        }
    }

    /// Credit collateral to a registered airline. Returns the airline's new
    /// deposited total.
    pub fn deposit(&mut self, airline: &Address, amount: u64) -> LedgerResult<u64> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let entry = self
            .airlines
            .get_mut(airline)
            .filter(|a| a.is_registered)
            .ok_or(LedgerError::Unauthorized)?;
        entry.deposited_value = entry
            .deposited_value
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        Ok(entry.deposited_value)
    }

    pub fn is_airline(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .is_some_and(|a| a.is_registered)
    }

    /// Whether an airline is registered and meets the funding threshold.
    pub fn is_funded(&self, address: &Address, config: &LedgerConfig) -> bool {
        self.airlines
            .get(address)
            .is_some_and(|a| a.is_registered && a.deposited_value >= config.funding_threshold)
    }

    pub fn votes_count(&self, address: &Address) -> usize {
        self.airlines.get(address).map_or(0, |a| a.votes.len())
    }

    pub fn deposited_value(&self, address: &Address) -> u64 {
        self.airlines.get(address).map_or(0, |a| a.deposited_value)
    }

    pub fn airlines_count(&self) -> usize {
        self.registered_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::address_from_label;

    fn funded_registry(count: usize, config: &LedgerConfig) -> (AirlineRegistry, Vec<Address>) {
        let airlines: Vec<Address> = (0..count)
            .map(|i| address_from_label(&format!("airline-{}", i)))
            .collect();
        let mut registry = AirlineRegistry::bootstrap(airlines[0].clone());
        registry
            .deposit(&airlines[0], config.funding_threshold)
            .unwrap();
        for i in 1..count {
            registry
                .register(&airlines[i - 1], &airlines[i], config)
                .unwrap();
            registry
                .deposit(&airlines[i], config.funding_threshold)
                .unwrap();
        }
        (registry, airlines)
    }

    #[test]
    fn test_unfunded_requester_is_unauthorized() {
        let config = LedgerConfig::default();
        let first = address_from_label("airline-0");
        let candidate = address_from_label("airline-1");
        let mut registry = AirlineRegistry::bootstrap(first.clone());

        let result = registry.register(&first, &candidate, &config);
        assert_eq!(result, Err(LedgerError::Unauthorized));
        assert!(!registry.is_airline(&candidate));
    }

    #[test]
    fn test_first_four_admitted_directly() {
        let config = LedgerConfig::default();
        let (registry, airlines) = funded_registry(4, &config);

        assert_eq!(registry.airlines_count(), 4);
        for airline in &airlines {
            assert!(registry.is_airline(airline));
            assert_eq!(registry.votes_count(airline), 0);
        }
    }

    #[test]
    fn test_fifth_airline_requires_majority() {
        let config = LedgerConfig::default();
        let (mut registry, airlines) = funded_registry(4, &config);
        let fifth = address_from_label("airline-4");

        let outcome = registry.register(&airlines[0], &fifth, &config).unwrap();
        assert_eq!(outcome, AdmissionOutcome::Voted { votes: 1 });
        assert!(!registry.is_airline(&fifth));
        assert_eq!(registry.airlines_count(), 4);

        let outcome = registry.register(&airlines[1], &fifth, &config).unwrap();
        assert_eq!(outcome, AdmissionOutcome::Admitted { votes: 2 });
        assert!(registry.is_airline(&fifth));
        assert_eq!(registry.airlines_count(), 5);
    }

    #[test]
    fn test_revote_does_not_increase_tally() {
        let config = LedgerConfig::default();
        let (mut registry, airlines) = funded_registry(4, &config);
        let fifth = address_from_label("airline-4");

        registry.register(&airlines[0], &fifth, &config).unwrap();
        let outcome = registry.register(&airlines[0], &fifth, &config).unwrap();

        assert_eq!(outcome, AdmissionOutcome::AlreadyVoted { votes: 1 });
        assert_eq!(registry.votes_count(&fifth), 1);
        assert!(!registry.is_airline(&fifth));
    }

    #[test]
    fn test_registering_member_again_fails() {
        let config = LedgerConfig::default();
        let (mut registry, airlines) = funded_registry(2, &config);

        let result = registry.register(&airlines[0], &airlines[1], &config);
        assert_eq!(result, Err(LedgerError::AlreadyRegistered));
    }

    #[test]
    fn test_deposit_rejects_zero_and_unregistered() {
        let config = LedgerConfig::default();
        let first = address_from_label("airline-0");
        let stranger = address_from_label("stranger");
        let mut registry = AirlineRegistry::bootstrap(first.clone());

        assert_eq!(
            registry.deposit(&first, 0),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(
            registry.deposit(&stranger, config.funding_threshold),
            Err(LedgerError::Unauthorized)
        );

        let total = registry.deposit(&first, 7).unwrap();
        assert_eq!(total, 7);
        assert_eq!(registry.deposited_value(&first), 7);
    }

    #[test]
    fn test_deposit_overflow_rejected() {
        let first = address_from_label("airline-0");
        let mut registry = AirlineRegistry::bootstrap(first.clone());

        registry.deposit(&first, u64::MAX).unwrap();
        assert_eq!(
            registry.deposit(&first, 1),
            Err(LedgerError::InvalidAmount)
        );
        // The recorded collateral is untouched by the rejected deposit.
        assert_eq!(registry.deposited_value(&first), u64::MAX);
    }

    #[test]
    fn test_majority_scales_with_member_count() {
        let config = LedgerConfig::default();
        let (mut registry, airlines) = funded_registry(4, &config);

        // 5th member: 2 of 4 votes suffice.
        let fifth = address_from_label("airline-4");
        registry.register(&airlines[0], &fifth, &config).unwrap();
        assert_eq!(
            registry.register(&airlines[1], &fifth, &config).unwrap(),
            AdmissionOutcome::Admitted { votes: 2 }
        );
        registry.deposit(&fifth, config.funding_threshold).unwrap();

        // 6th member: 2 of 5 is short (4 < 5), 3 crosses.
        let sixth = address_from_label("airline-5");
        assert_eq!(
            registry.register(&airlines[0], &sixth, &config).unwrap(),
            AdmissionOutcome::Voted { votes: 1 }
        );
        assert_eq!(
            registry.register(&airlines[1], &sixth, &config).unwrap(),
            AdmissionOutcome::Voted { votes: 2 }
        );
        assert_eq!(
            registry.register(&airlines[2], &sixth, &config).unwrap(),
            AdmissionOutcome::Admitted { votes: 3 }
        );
        assert_eq!(registry.airlines_count(), 6);
    }
}
