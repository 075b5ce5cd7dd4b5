//! Booking records and fare computation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, bounded, finite};
use super::ids::{AccountId, BookingId, BusId, RouteId};

/// Maximum length of a payment reference.
pub const PAYMENT_ID_MAX_LEN: usize = 50;

/// Ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Waiting for payment confirmation.
    #[default]
    AwaitingConfirmation,
    Booked,
    Cancelled,
}

impl BookingStatus {
    /// Every status, in menu order.
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::AwaitingConfirmation,
        BookingStatus::Booked,
        BookingStatus::Cancelled,
    ];

    /// Single-letter code stored in the `status` column.
    pub fn code(self) -> &'static str {
        match self {
            BookingStatus::AwaitingConfirmation => "I",
            BookingStatus::Booked => "B",
            BookingStatus::Cancelled => "C",
        }
    }

    /// Parse a stored code.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "I" => Ok(BookingStatus::AwaitingConfirmation),
            "B" => Ok(BookingStatus::Booked),
            "C" => Ok(BookingStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }

    /// Serialized name, as used in JSON and form fields.
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::AwaitingConfirmation => "awaiting_confirmation",
            BookingStatus::Booked => "booked",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a serialized name.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::AwaitingConfirmation => "Waiting Confirmation",
            BookingStatus::Booked => "Booked",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub passenger: AccountId,
    pub route: RouteId,
    pub bus: BusId,
    pub cost: f64,
    pub payment_id: String,
    pub departure_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl NewBooking {
    /// Validate raw booking fields.
    pub fn new(
        passenger: AccountId,
        route: RouteId,
        bus: BusId,
        cost: f64,
        payment_id: &str,
        departure_date: DateTime<Utc>,
        status: BookingStatus,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            passenger,
            route,
            bus,
            cost: finite("cost", cost)?,
            payment_id: bounded("payment_id", payment_id, PAYMENT_ID_MAX_LEN)?,
            departure_date,
            status,
        })
    }

    /// Attach the id assigned by the store.
    pub fn with_id(self, id: BookingId) -> Booking {
        Booking {
            id,
            passenger: self.passenger,
            route: self.route,
            bus: self.bus,
            cost: self.cost,
            payment_id: self.payment_id,
            departure_date: self.departure_date,
            status: self.status,
        }
    }
}

/// A stored booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub passenger: AccountId,
    pub route: RouteId,
    pub bus: BusId,
    pub cost: f64,
    /// Free-text payment reference; not validated against any gateway.
    pub payment_id: String,
    pub departure_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Booking {
    /// Recompute the fare as `bus_rates * route_cost`, overwrite the stored
    /// cost and return it.
    pub fn total_cost(&mut self, bus_rates: f64, route_cost: f64) -> f64 {
        self.cost = bus_rates * route_cost;
        self.cost
    }
}
