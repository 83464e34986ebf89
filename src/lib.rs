pub mod config;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod oracle;
pub mod utils;

/// Opaque address-like caller identity, issued by the surrounding platform.
pub type Address = Vec<u8>;

// Re-export commonly used items
pub use config::LedgerConfig;
pub use errors::{LedgerError, LedgerResult};
pub use events::{EventOutbox, LedgerEvent};
pub use ledger::airlines::{AdmissionOutcome, Airline, AirlineRegistry};
pub use ledger::flights::{Flight, FlightKey, FlightRegistry, FlightStatus};
pub use ledger::funds::{FundLedger, ValueTransfer};
pub use ledger::insurance::{InsuranceEscrow, PolicyBook};
pub use ledger::SuretyLedger;
pub use oracle::{
    EntropyIndexSource, IndexSource, OracleCoordinator, ResponseOutcome, ScriptedIndexSource,
};
