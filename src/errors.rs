use thiserror::Error;

/// Errors raised by ledger operations. Every operation either fully applies
/// or rejects with one of these; no error leaves partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller lacks the required role or funding")]
    Unauthorized,

    #[error("ledger operations are suspended")]
    NotOperational,

    #[error("airline is already registered")]
    AlreadyRegistered,

    #[error("flight with this key is already registered")]
    DuplicateFlight,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insurance value exceeds the per-passenger cap")]
    ExceedsCap,

    #[error("passenger already holds a policy on this flight")]
    DuplicatePolicy,

    #[error("oracle registration fee is below the required price")]
    InsufficientFee,

    #[error("no withdrawable balance")]
    InsufficientBalance,

    #[error("flight is not registered")]
    FlightNotRegistered,

    #[error("oracle is not assigned to the submitted index")]
    OracleNotMatched,

    #[error("no status request exists for the submitted key")]
    UnknownRequest,

    #[error("value transfer failed: {0}")]
    TransferFailed(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
