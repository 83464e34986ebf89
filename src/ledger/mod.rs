pub mod airlines;
pub mod flights;
pub mod funds;
pub mod insurance;

use log::info;

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{EventOutbox, LedgerEvent};
use crate::oracle::{IndexSource, OracleCoordinator, ResponseOutcome};
use crate::utils::address_hex;
use crate::Address;

use airlines::{AdmissionOutcome, AirlineRegistry};
use flights::{Flight, FlightKey, FlightRegistry, FlightStatus};
use funds::{FundLedger, ValueTransfer};
use insurance::InsuranceEscrow;

/// The single owned store of ledger state, and the transactional facade over
/// it. Every mutating call is a serialized transaction: it either fully
/// applies, appending its events to the outbox, or rejects leaving no trace.
///
/// The surrounding platform serializes calls (one `&mut` caller at a time)
/// and delivers drained events; this core never blocks or suspends.
pub struct SuretyLedger {
    pub config: LedgerConfig,
    owner: Address,
    operational: bool,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub insurance: InsuranceEscrow,
    pub funds: FundLedger,
    pub oracles: OracleCoordinator,
    outbox: EventOutbox,
}

impl SuretyLedger {
    /// Create the ledger with its founding airline admitted, mirroring the
    /// deployment-time bootstrap.
    pub fn new(config: LedgerConfig, owner: Address, first_airline: Address) -> Self {
        SuretyLedger {
            config,
            owner,
            operational: true,
            airlines: AirlineRegistry::bootstrap(first_airline),
            flights: FlightRegistry::default(),
            insurance: InsuranceEscrow::new(),
            funds: FundLedger::new(),
            oracles: OracleCoordinator::new(),
            outbox: EventOutbox::new(),
        }
    }

    /// Same as `new` but with an injected index source, for deterministic
    /// tests and simulations.
    pub fn with_index_source(
        config: LedgerConfig,
        owner: Address,
        first_airline: Address,
        index_source: Box<dyn IndexSource + Send>,
    ) -> Self {
        let mut ledger = SuretyLedger::new(config, owner, first_airline);
        ledger.oracles = OracleCoordinator::with_index_source(index_source);
        ledger
    }

    // ---- operational control ----

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Owner-only pause switch. Reads stay available while paused.
    pub fn set_operational(&mut self, caller: &Address, operational: bool) -> LedgerResult<()> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized);
        }
        self.operational = operational;
        info!("ledger operational status set to {}", operational);
        Ok(())
    }

    fn ensure_operational(&self) -> LedgerResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(LedgerError::NotOperational)
        }
    }

    // ---- airline admission and funding ----

    /// Request admission of `candidate`, voting on its behalf when the
    /// direct-admission window has closed.
    pub fn register_airline(
        &mut self,
        requester: &Address,
        candidate: &Address,
    ) -> LedgerResult<AdmissionOutcome> {
        self.ensure_operational()?;
        let outcome = self.airlines.register(requester, candidate, &self.config)?;
        match outcome {
            AdmissionOutcome::Admitted { votes } => self.outbox.emit(LedgerEvent::AirlineRegistered {
                airline: candidate.clone(),
                votes,
            }),
            AdmissionOutcome::Voted { votes } => self.outbox.emit(LedgerEvent::AirlineVoted {
                airline: candidate.clone(),
                votes,
            }),
            // A duplicate vote changes nothing and reports nothing.
            AdmissionOutcome::AlreadyVoted { .. } => {}
        }
        Ok(outcome)
    }

    /// Deposit collateral for a registered airline.
    pub fn deposit(&mut self, airline: &Address, amount: u64) -> LedgerResult<()> {
        self.ensure_operational()?;
        if !self.funds.can_accept(amount) {
            return Err(LedgerError::InvalidAmount);
        }
        let deposited_value = self.airlines.deposit(airline, amount)?;
        self.funds.add_funds(amount)?;
        self.outbox.emit(LedgerEvent::AirlineDeposit {
            airline: airline.clone(),
            amount,
            deposited_value,
        });
        Ok(())
    }

    // ---- flights ----

    pub fn register_flight(
        &mut self,
        airline: &Address,
        flight_code: &str,
        timestamp: u64,
    ) -> LedgerResult<()> {
        self.ensure_operational()?;
        if !self.airlines.is_airline(airline) {
            return Err(LedgerError::Unauthorized);
        }
        let key = FlightKey::new(airline.clone(), flight_code, timestamp);
        self.flights.register(key.clone())?;
        info!(
            "flight {} at {} registered by airline {}",
            flight_code,
            timestamp,
            address_hex(airline)
        );
        self.outbox.emit(LedgerEvent::FlightRegistered { flight: key });
        Ok(())
    }

    // ---- insurance ----

    pub fn purchase_insurance(
        &mut self,
        passenger: &Address,
        airline: &Address,
        flight_code: &str,
        timestamp: u64,
        amount: u64,
    ) -> LedgerResult<()> {
        self.ensure_operational()?;
        let key = FlightKey::new(airline.clone(), flight_code, timestamp);
        if !self.flights.contains(&key) {
            return Err(LedgerError::FlightNotRegistered);
        }
        if !self.funds.can_accept(amount) {
            return Err(LedgerError::InvalidAmount);
        }
        self.insurance
            .purchase(&key, passenger, amount, &self.config)?;
        self.funds.add_funds(amount)?;
        self.outbox.emit(LedgerEvent::PurchasedInsurance {
            flight: key,
            passenger: passenger.clone(),
            amount,
        });
        Ok(())
    }

    /// Pay out a passenger's full credited balance through the platform's
    /// transfer seam.
    pub fn withdraw(
        &mut self,
        passenger: &Address,
        sink: &mut dyn ValueTransfer,
    ) -> LedgerResult<u64> {
        self.ensure_operational()?;
        self.funds.withdraw(passenger, sink)
    }

    // ---- oracle protocol ----

    /// Admit an oracle; its fee joins the pooled funds.
    pub fn register_oracle(&mut self, oracle: &Address, fee: u64) -> LedgerResult<[u8; 3]> {
        self.ensure_operational()?;
        if !self.funds.can_accept(fee) {
            return Err(LedgerError::InvalidAmount);
        }
        let indexes = self.oracles.register(oracle, fee, &self.config)?;
        self.funds.add_funds(fee)?;
        Ok(indexes)
    }

    /// Raise a status query for a flight. Any caller may ask; oracles whose
    /// buckets contain the returned index are expected to respond.
    pub fn request_status(
        &mut self,
        airline: &Address,
        flight_code: &str,
        timestamp: u64,
    ) -> LedgerResult<u8> {
        self.ensure_operational()?;
        let key = FlightKey::new(airline.clone(), flight_code, timestamp);
        let index = self.oracles.open_request(key.clone(), &self.config);
        self.outbox.emit(LedgerEvent::OracleRequest { index, flight: key });
        Ok(index)
    }

    /// Record an oracle's response; on quorum, finalize the flight status
    /// and, for airline-fault delays, credit insurance payouts. Finalization
    /// and crediting each happen at most once per flight no matter how many
    /// submissions race past the threshold.
    pub fn submit_oracle_response(
        &mut self,
        oracle: &Address,
        index: u8,
        airline: &Address,
        flight_code: &str,
        timestamp: u64,
        status: FlightStatus,
    ) -> LedgerResult<ResponseOutcome> {
        self.ensure_operational()?;
        let key = FlightKey::new(airline.clone(), flight_code, timestamp);
        let outcome = self
            .oracles
            .submit(oracle, index, &key, status, &self.config)?;
        if let ResponseOutcome::Resolved { status, .. } = outcome {
            self.outbox.emit(LedgerEvent::OracleReport {
                flight: key.clone(),
                status,
            });
            self.finalize_status(&key, status)?;
        }
        Ok(outcome)
    }

    fn finalize_status(&mut self, key: &FlightKey, status: FlightStatus) -> LedgerResult<()> {
        if !self.flights.set_status(key, status) {
            // Unknown flight or already terminal; nothing further to apply.
            return Ok(());
        }
        self.outbox.emit(LedgerEvent::FlightStatusInfo {
            flight: key.clone(),
            status,
        });
        if status == FlightStatus::LateAirline {
            self.insurance
                .credit_payouts(key, &self.config, &mut self.funds)?;
        }
        Ok(())
    }

    // ---- read-only queries ----

    pub fn is_airline(&self, address: &Address) -> bool {
        self.airlines.is_airline(address)
    }

    pub fn votes_count(&self, address: &Address) -> usize {
        self.airlines.votes_count(address)
    }

    pub fn airlines_count(&self) -> usize {
        self.airlines.airlines_count()
    }

    pub fn airline_deposited_value(&self, address: &Address) -> u64 {
        self.airlines.deposited_value(address)
    }

    pub fn get_flight(&self, index: usize) -> Option<&Flight> {
        self.flights.get(index)
    }

    pub fn flight_status(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.flights.status_of(key)
    }

    pub fn flights_count(&self) -> usize {
        self.flights.count()
    }

    pub fn balance_of(&self, passenger: &Address) -> u64 {
        self.funds.balance_of(passenger)
    }

    pub fn passengers_count(&self, key: &FlightKey) -> usize {
        self.insurance.passengers_count(key)
    }

    pub fn passenger_insurance_value(&self, key: &FlightKey, passenger: &Address) -> u64 {
        self.insurance.passenger_insurance_value(key, passenger)
    }

    pub fn oracle_indexes(&self, oracle: &Address) -> Option<[u8; 3]> {
        self.oracles.indexes_of(oracle)
    }

    /// Take every event appended by transactions since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.outbox.drain()
    }
}
