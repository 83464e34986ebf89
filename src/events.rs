use serde::{Deserialize, Serialize};

use crate::ledger::flights::{FlightKey, FlightStatus};
use crate::Address;

/// Notifications produced by committed ledger transactions. The core never
/// delivers these itself; callers drain the outbox after each call and hand
/// the events to the platform's log/subscription primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An airline crossed the admission threshold (or was admitted directly,
    /// in which case `votes` is zero).
    AirlineRegistered { airline: Address, votes: usize },
    /// A vote was recorded for a still-pending candidate.
    AirlineVoted { airline: Address, votes: usize },
    /// Collateral was deposited; `deposited_value` is the airline's running total.
    AirlineDeposit {
        airline: Address,
        amount: u64,
        deposited_value: u64,
    },
    FlightRegistered { flight: FlightKey },
    PurchasedInsurance {
        flight: FlightKey,
        passenger: Address,
        amount: u64,
    },
    /// A status query was raised; oracles holding `index` should respond.
    OracleRequest { index: u8, flight: FlightKey },
    /// A quorum of matching oracle responses finalized a status.
    OracleReport {
        flight: FlightKey,
        status: FlightStatus,
    },
    /// The flight record's status was updated.
    FlightStatusInfo {
        flight: FlightKey,
        status: FlightStatus,
    },
}

/// Append-only event buffer, drained by the caller after each transaction.
#[derive(Debug, Default)]
pub struct EventOutbox {
    events: Vec<LedgerEvent>,
}

impl EventOutbox {
    pub fn new() -> Self {
        EventOutbox { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events without draining them.
    pub fn pending(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
