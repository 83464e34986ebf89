use serde::{Deserialize, Serialize};

/// One ether-equivalent in the ledger's base denomination.
pub const UNIT: u64 = 1_000_000_000;

// Airline admission constants
pub const DIRECT_ADMISSION_LIMIT: usize = 4; // Airlines admitted without a vote
pub const FUNDING_THRESHOLD: u64 = 10 * UNIT; // Collateral required before an airline may act

// Insurance constants
pub const MAX_INSURANCE_VALUE: u64 = UNIT; // Per-passenger cap per flight
pub const PAYOUT_NUMERATOR: u64 = 3;
pub const PAYOUT_DENOMINATOR: u64 = 2; // Reimbursement is 1.5x the premium paid

// Oracle constants
pub const ORACLE_REGISTRATION_FEE: u64 = UNIT;
pub const ORACLE_INDEX_RANGE: u8 = 10; // Index buckets 0-9
pub const ORACLE_QUORUM_THRESHOLD: usize = 3; // Matching responses required to resolve
pub const INDEXES_PER_ORACLE: usize = 3;

/// Tunable protocol parameters. Defaults reproduce the constants above;
/// deployments may override them from a TOML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Airlines admitted directly before multiparty consensus kicks in
    pub direct_admission_limit: usize,
    /// Minimum deposited collateral before an airline may register others
    pub funding_threshold: u64,
    /// Maximum insurance value a passenger may hold on one flight
    pub max_insurance_value: u64,
    /// Payout ratio applied to the premium on an airline-fault delay
    pub payout_numerator: u64,
    pub payout_denominator: u64,
    /// Fee an oracle pays to join the pool
    pub oracle_registration_fee: u64,
    /// Exclusive upper bound of the index bucket space
    pub index_range: u8,
    /// Distinct matching responses required to finalize a status
    pub quorum_threshold: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            direct_admission_limit: DIRECT_ADMISSION_LIMIT,
            funding_threshold: FUNDING_THRESHOLD,
            max_insurance_value: MAX_INSURANCE_VALUE,
            payout_numerator: PAYOUT_NUMERATOR,
            payout_denominator: PAYOUT_DENOMINATOR,
            oracle_registration_fee: ORACLE_REGISTRATION_FEE,
            index_range: ORACLE_INDEX_RANGE,
            quorum_threshold: ORACLE_QUORUM_THRESHOLD,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from a TOML fragment; missing keys keep their
    /// default values.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Payout owed for a given premium, or `None` when the product would
    /// exceed the ledger's denomination range.
    pub fn payout_for(&self, premium: u64) -> Option<u64> {
        premium
            .checked_mul(self.payout_numerator)
            .map(|v| v / self.payout_denominator)
    }
}
