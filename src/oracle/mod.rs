use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::flights::{FlightKey, FlightStatus};
use crate::utils::address_hex;
use crate::Address;

/// Source of pseudo-random index buckets. Production draws from entropy;
/// tests and off-ledger simulations inject a scripted source.
pub trait IndexSource {
    /// Next bucket in `0..range`.
    fn next_index(&mut self, range: u8) -> u8;
}

/// High-entropy index source backed by a ChaCha20 stream.
pub struct EntropyIndexSource {
    rng: ChaCha20Rng,
}

impl EntropyIndexSource {
    pub fn new() -> Self {
        EntropyIndexSource {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Deterministic stream for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        EntropyIndexSource {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyIndexSource {
    fn default() -> Self {
        EntropyIndexSource::new()
    }
}

impl IndexSource for EntropyIndexSource {
    fn next_index(&mut self, range: u8) -> u8 {
        self.rng.gen_range(0..range.max(1))
    }
}

/// Replays a fixed script of buckets, then falls back to a constant. Used by
/// tests and oracle-process simulations that need full control over index
/// assignment.
pub struct ScriptedIndexSource {
    script: VecDeque<u8>,
    fallback: u8,
}

impl ScriptedIndexSource {
    pub fn new(script: impl IntoIterator<Item = u8>, fallback: u8) -> Self {
        ScriptedIndexSource {
            script: script.into_iter().collect(),
            fallback,
        }
    }
}

impl IndexSource for ScriptedIndexSource {
    fn next_index(&mut self, range: u8) -> u8 {
        self.script.pop_front().unwrap_or(self.fallback) % range.max(1)
    }
}

/// A registered oracle and its three assigned index buckets. Duplicates
/// among the three are permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oracle {
    pub indexes: [u8; 3],
}

impl Oracle {
    pub fn matches(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Identity of a status request: the drawn index bucket plus the flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub index: u8,
    pub flight: FlightKey,
}

/// Collected responses to one status query. Terminal (and immutable for
/// quorum purposes) once any code accumulates a quorum of distinct oracles.
#[derive(Debug)]
pub struct StatusRequest {
    pub is_open: bool,
    pub responses: HashMap<FlightStatus, HashSet<Address>>,
    pub resolved_status: Option<FlightStatus>,
}

impl StatusRequest {
    fn open() -> Self {
        StatusRequest {
            is_open: true,
            responses: HashMap::new(),
            resolved_status: None,
        }
    }

    /// Distinct oracles that voted a given code.
    pub fn votes_for(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map_or(0, |s| s.len())
    }
}

/// Outcome of a response submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Vote recorded; quorum not yet reached for this code.
    Recorded { votes: usize },
    /// This vote crossed the quorum threshold and resolved the request.
    Resolved { status: FlightStatus, votes: usize },
    /// The request was already resolved; the response was kept but earns no
    /// quorum credit.
    Ignored,
}

/// Pool of registered oracles and the open status requests they feed.
///
/// Each query is sharded to the oracles whose assigned buckets contain the
/// drawn index, so only a fraction of the pool needs to answer. Quorum is
/// evaluated independently per status code; the first code to accumulate
/// enough distinct responses wins, exactly once.
pub struct OracleCoordinator {
    pub oracles: HashMap<Address, Oracle>,
    pub requests: HashMap<RequestKey, StatusRequest>,
    index_source: Box<dyn IndexSource + Send>,
}

impl OracleCoordinator {
    pub fn new() -> Self {
        Self::with_index_source(Box::new(EntropyIndexSource::new()))
    }

    pub fn with_index_source(index_source: Box<dyn IndexSource + Send>) -> Self {
        OracleCoordinator {
            oracles: HashMap::new(),
            requests: HashMap::new(),
            index_source,
        }
    }

    /// Admit an oracle to the pool and assign its three index buckets.
    pub fn register(
        &mut self,
        oracle: &Address,
        fee: u64,
        config: &LedgerConfig,
    ) -> LedgerResult<[u8; 3]> {
        if fee < config.oracle_registration_fee {
            return Err(LedgerError::InsufficientFee);
        }
        let range = config.index_range;
        let indexes = [
            self.index_source.next_index(range),
            self.index_source.next_index(range),
            self.index_source.next_index(range),
        ];
        self.oracles.insert(oracle.clone(), Oracle { indexes });
        info!(
            "oracle {} registered with indexes {:?}",
            address_hex(oracle),
            indexes
        );
        Ok(indexes)
    }

    pub fn indexes_of(&self, oracle: &Address) -> Option<[u8; 3]> {
        self.oracles.get(oracle).map(|o| o.indexes)
    }

    pub fn oracles_count(&self) -> usize {
        self.oracles.len()
    }

    /// Draw an index for a status query and open (or reuse) the request
    /// keyed by it. Returns the drawn index.
    pub fn open_request(&mut self, flight: FlightKey, config: &LedgerConfig) -> u8 {
        let index = self.index_source.next_index(config.index_range);
        let key = RequestKey {
            index,
            flight: flight.clone(),
        };
        self.requests.entry(key).or_insert_with(StatusRequest::open);
        debug!(
            "status request at index {} for flight {} of airline {}",
            index,
            flight.flight_code,
            address_hex(&flight.airline)
        );
        index
    }

    /// Record an oracle's vote for a status code.
    ///
    /// The submitting oracle must hold the request's index. Responses that
    /// arrive after resolution are kept for the record but earn no quorum
    /// credit, so slow honest oracles are not penalized.
    pub fn submit(
        &mut self,
        oracle: &Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
        config: &LedgerConfig,
    ) -> LedgerResult<ResponseOutcome> {
        let assigned = self
            .oracles
            .get(oracle)
            .ok_or(LedgerError::Unauthorized)?;
        if !assigned.matches(index) {
            return Err(LedgerError::OracleNotMatched);
        }

        let key = RequestKey {
            index,
            flight: flight.clone(),
        };
        let request = self
            .requests
            .get_mut(&key)
            .ok_or(LedgerError::UnknownRequest)?;

        let voters = request.responses.entry(status).or_default();
        voters.insert(oracle.clone());
        if !request.is_open {
            return Ok(ResponseOutcome::Ignored);
        }

        let votes = voters.len();
        if votes >= config.quorum_threshold {
            request.is_open = false;
            request.resolved_status = Some(status);
            info!(
                "request at index {} resolved to {:?} with {} matching responses",
                index, status, votes
            );
            Ok(ResponseOutcome::Resolved { status, votes })
        } else {
            Ok(ResponseOutcome::Recorded { votes })
        }
    }

    pub fn request(&self, index: u8, flight: &FlightKey) -> Option<&StatusRequest> {
        self.requests.get(&RequestKey {
            index,
            flight: flight.clone(),
        })
    }
}

impl Default for OracleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
