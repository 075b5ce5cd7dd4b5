//! Domain types for the booking server.
//!
//! This module contains the record types for accounts, buses, routes and
//! bookings. Every type enforces its field invariants at construction
//! time, so code that receives these types can trust their validity.

mod account;
mod booking;
mod bus;
mod city;
mod contact;
mod error;
mod ids;
mod route;

pub use account::{Account, AccountCore, AccountKind, KindTag, NAME_MAX_LEN, NewAccount};
pub use booking::{Booking, BookingStatus, NewBooking, PAYMENT_ID_MAX_LEN};
pub use bus::{BUS_TEXT_MAX_LEN, Bus, DEFAULT_RATES, NewBus, Seats};
pub use city::City;
pub use contact::{Email, NationalId, Phone, StaffId};
pub use error::DomainError;
pub use ids::{AccountId, BookingId, BusId, RouteId};
pub use route::{NewRoute, Route};
