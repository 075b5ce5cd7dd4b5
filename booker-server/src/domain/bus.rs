//! Bus records and seat counts.

use std::fmt;

use serde::Serialize;

use super::error::{DomainError, finite, required};
use super::ids::{AccountId, BusId};

/// Maximum length of the bus name and its source/destination labels.
pub const BUS_TEXT_MAX_LEN: usize = 30;

/// Default per-distance rate.
pub const DEFAULT_RATES: f64 = 1.0;

/// A two-digit seat count (0 to 99).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Seats(u8);

impl Seats {
    /// Largest representable count.
    pub const MAX: u8 = 99;

    /// Build a seat count, naming the field in the error.
    pub fn new(field: &'static str, value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(n) if n <= Self::MAX => Ok(Seats(n)),
            _ => Err(DomainError::SeatsOutOfRange { field, value }),
        }
    }

    /// The count as an integer.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Seats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated bus that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBus {
    pub bus_name: String,
    pub driver: AccountId,
    pub source: String,
    pub destination: String,
    pub capacity: Seats,
    pub booked: Seats,
    pub is_full: bool,
    pub routes: String,
    pub rates: f64,
}

impl NewBus {
    /// Validate raw bus fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bus_name: &str,
        driver: AccountId,
        source: &str,
        destination: &str,
        capacity: i64,
        booked: i64,
        is_full: bool,
        routes: &str,
        rates: f64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            bus_name: required("bus_name", bus_name, BUS_TEXT_MAX_LEN)?,
            driver,
            source: required("source", source, BUS_TEXT_MAX_LEN)?,
            destination: required("destination", destination, BUS_TEXT_MAX_LEN)?,
            capacity: Seats::new("capacity", capacity)?,
            booked: Seats::new("booked", booked)?,
            is_full,
            routes: required("routes", routes, usize::MAX)?,
            rates: finite("rates", rates)?,
        })
    }

    /// Attach the id assigned by the store.
    pub fn with_id(self, id: BusId) -> Bus {
        Bus {
            id,
            bus_name: self.bus_name,
            driver: self.driver,
            source: self.source,
            destination: self.destination,
            capacity: self.capacity,
            booked: self.booked,
            is_full: self.is_full,
            routes: self.routes,
            rates: self.rates,
        }
    }
}

/// A stored bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub id: BusId,
    pub bus_name: String,
    pub driver: AccountId,
    pub source: String,
    pub destination: String,
    pub capacity: Seats,
    pub booked: Seats,
    pub is_full: bool,
    /// Free-text description of the stops this bus serves.
    pub routes: String,
    pub rates: f64,
}

impl Bus {
    /// Recompute the full flag from the seat counts and return it.
    ///
    /// This is a read-then-set on an in-memory copy. Concurrent writers go
    /// through `BusStore::reserve_seat` instead.
    pub fn full_capacity(&mut self) -> bool {
        self.is_full = self.booked == self.capacity;
        self.is_full
    }

    /// Seats still free.
    pub fn seats_left(&self) -> u8 {
        self.capacity.get().saturating_sub(self.booked.get())
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bus_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(capacity: i64, booked: i64) -> Bus {
        NewBus::new(
            "Easy Coach 1",
            AccountId(1),
            "Nairobi",
            "Kisumu",
            capacity,
            booked,
            false,
            "Nairobi - Nakuru - Kisumu",
            DEFAULT_RATES,
        )
        .unwrap()
        .with_id(BusId(1))
    }

    #[test]
    fn full_when_booked_equals_capacity() {
        let mut bus = bus(50, 50);
        assert!(bus.full_capacity());
        assert!(bus.is_full);
    }

    #[test]
    fn not_full_below_capacity() {
        let mut bus = bus(50, 49);
        assert!(!bus.full_capacity());
        assert_eq!(bus.seats_left(), 1);
    }

    #[test]
    fn stale_flag_is_cleared() {
        let mut bus = bus(50, 10);
        bus.is_full = true;
        assert!(!bus.full_capacity());
        assert!(!bus.is_full);
    }

    #[test]
    fn seats_range() {
        assert!(Seats::new("capacity", 0).is_ok());
        assert!(Seats::new("capacity", 99).is_ok());
        assert_eq!(
            Seats::new("capacity", 100),
            Err(DomainError::SeatsOutOfRange {
                field: "capacity",
                value: 100
            })
        );
        assert!(Seats::new("booked", -1).is_err());
    }

    #[test]
    fn validation() {
        let err = NewBus::new(
            "",
            AccountId(1),
            "a",
            "b",
            1,
            0,
            false,
            "r",
            1.0,
        );
        assert_eq!(err, Err(DomainError::Blank("bus_name")));

        let err = NewBus::new(
            &"x".repeat(31),
            AccountId(1),
            "a",
            "b",
            1,
            0,
            false,
            "r",
            1.0,
        );
        assert!(matches!(err, Err(DomainError::TooLong { field: "bus_name", .. })));
    }

    #[test]
    fn display_is_name() {
        assert_eq!(bus(1, 0).to_string(), "Easy Coach 1");
    }
}
