use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{LedgerError, LedgerResult};
use crate::Address;

/// Flight status codes, using the wire values carried by oracle responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlightStatus {
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl FlightStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }
}

/// Composite flight identity: the operating airline, its flight code, and
/// the scheduled departure timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Address,
    pub flight_code: String,
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: Address, flight_code: &str, timestamp: u64) -> Self {
        FlightKey {
            airline,
            flight_code: flight_code.to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
}

/// Uniquely keyed flight records. Insertion order is kept so callers can
/// enumerate flights by index.
#[derive(Debug, Default)]
pub struct FlightRegistry {
    flights: HashMap<FlightKey, Flight>,
    order: Vec<FlightKey>,
}

impl FlightRegistry {
    /// Register a flight with status `Unknown`. A second registration with
    /// the same key fails without mutating state.
    pub fn register(&mut self, key: FlightKey) -> LedgerResult<()> {
        if self.flights.contains_key(&key) {
            return Err(LedgerError::DuplicateFlight);
        }
        self.order.push(key.clone());
        self.flights.insert(
            key.clone(),
            Flight {
                key,
                status: FlightStatus::Unknown,
            },
        );
        Ok(())
    }

    /// Record a resolved status. Returns `true` only when the write applied:
    /// unknown keys and flights already carrying a terminal status are
    /// no-ops, as is writing `Unknown` itself.
    pub fn set_status(&mut self, key: &FlightKey, status: FlightStatus) -> bool {
        match self.flights.get_mut(key) {
            Some(flight)
                if flight.status == FlightStatus::Unknown && status != FlightStatus::Unknown =>
            {
                flight.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    pub fn status_of(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.flights.get(key).map(|f| f.status)
    }

    pub fn by_key(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// Flight at a given registration position.
    pub fn get(&self, index: usize) -> Option<&Flight> {
        self.order.get(index).and_then(|key| self.flights.get(key))
    }

    pub fn count(&self) -> usize {
        self.flights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::address_from_label;

    fn key(code: &str) -> FlightKey {
        FlightKey::new(address_from_label("airline-0"), code, 1_642_265_173)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = FlightRegistry::default();
        registry.register(key("TE1921")).unwrap();

        assert!(registry.contains(&key("TE1921")));
        assert_eq!(registry.status_of(&key("TE1921")), Some(FlightStatus::Unknown));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get(0).unwrap().key, key("TE1921"));
    }

    #[test]
    fn test_duplicate_key_rejected_without_mutation() {
        let mut registry = FlightRegistry::default();
        registry.register(key("TE1921")).unwrap();
        registry.set_status(&key("TE1921"), FlightStatus::OnTime);

        let result = registry.register(key("TE1921"));
        assert_eq!(result, Err(LedgerError::DuplicateFlight));
        assert_eq!(registry.status_of(&key("TE1921")), Some(FlightStatus::OnTime));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_same_code_different_timestamp_is_distinct() {
        let mut registry = FlightRegistry::default();
        let airline = address_from_label("airline-0");
        registry
            .register(FlightKey::new(airline.clone(), "TE1921", 100))
            .unwrap();
        registry
            .register(FlightKey::new(airline, "TE1921", 200))
            .unwrap();
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_status_writes_once() {
        let mut registry = FlightRegistry::default();
        registry.register(key("TE1921")).unwrap();

        assert!(registry.set_status(&key("TE1921"), FlightStatus::LateAirline));
        // Terminal: later writes are no-ops
        assert!(!registry.set_status(&key("TE1921"), FlightStatus::OnTime));
        assert_eq!(
            registry.status_of(&key("TE1921")),
            Some(FlightStatus::LateAirline)
        );
    }

    #[test]
    fn test_status_ignores_unknown_keys_and_unknown_code() {
        let mut registry = FlightRegistry::default();
        assert!(!registry.set_status(&key("GHOST"), FlightStatus::OnTime));

        registry.register(key("TE1921")).unwrap();
        assert!(!registry.set_status(&key("TE1921"), FlightStatus::Unknown));
        assert_eq!(registry.status_of(&key("TE1921")), Some(FlightStatus::Unknown));
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            FlightStatus::Unknown,
            FlightStatus::OnTime,
            FlightStatus::LateAirline,
            FlightStatus::LateWeather,
            FlightStatus::LateTechnical,
            FlightStatus::LateOther,
        ] {
            assert_eq!(FlightStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FlightStatus::from_code(25), None);
    }
}
