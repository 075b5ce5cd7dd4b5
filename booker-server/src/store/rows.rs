//! Raw table rows and their conversion to domain types.
//!
//! Rows are decoded with primitive column types and then re-validated, so a
//! row edited by hand into an invalid state surfaces as
//! [`StoreError::Domain`](super::StoreError::Domain) instead of a panic.

use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountCore, AccountId, AccountKind, Booking, BookingId, BookingStatus, Bus, BusId,
    City, DomainError, Email, KindTag, NationalId, Phone, Route, RouteId, Seats, StaffId,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AccountRow {
    id: i64,
    kind: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    national_id: String,
    is_active: bool,
    is_admin: bool,
    password: String,
    last_login: Option<DateTime<Utc>>,
    staff_id: Option<String>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let kind = match (KindTag::parse(&row.kind)?, row.staff_id) {
            (KindTag::Basic, _) => AccountKind::Basic,
            (KindTag::Passenger, _) => AccountKind::Passenger,
            (KindTag::Driver, Some(staff_id)) => AccountKind::Driver {
                staff_id: StaffId::parse(&staff_id)?,
            },
            (KindTag::Driver, None) => return Err(DomainError::InvalidStaffId),
        };

        Ok(Account {
            id: AccountId(row.id),
            core: AccountCore {
                first_name: row.first_name,
                last_name: row.last_name,
                email: Email::parse(&row.email)?,
                phone: Phone::parse(&row.phone)?,
                national_id: NationalId::parse(&row.national_id)?,
                is_active: row.is_active,
                is_admin: row.is_admin,
            },
            kind,
            password: row.password,
            last_login: row.last_login,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BusRow {
    id: i64,
    bus_name: String,
    driver_id: i64,
    source: String,
    destination: String,
    capacity: i64,
    booked: i64,
    is_full: bool,
    routes: String,
    rates: f64,
}

impl TryFrom<BusRow> for Bus {
    type Error = DomainError;

    fn try_from(row: BusRow) -> Result<Self, Self::Error> {
        Ok(Bus {
            id: BusId(row.id),
            bus_name: row.bus_name,
            driver: AccountId(row.driver_id),
            source: row.source,
            destination: row.destination,
            capacity: Seats::new("capacity", row.capacity)?,
            booked: Seats::new("booked", row.booked)?,
            is_full: row.is_full,
            routes: row.routes,
            rates: row.rates,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RouteRow {
    id: i64,
    source: String,
    destination: String,
    cost: f64,
}

impl TryFrom<RouteRow> for Route {
    type Error = DomainError;

    fn try_from(row: RouteRow) -> Result<Self, Self::Error> {
        Ok(Route {
            id: RouteId(row.id),
            source: City::parse(&row.source)?,
            destination: City::parse(&row.destination)?,
            cost: row.cost,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookingRow {
    id: i64,
    passenger_id: i64,
    route_id: i64,
    bus_id: i64,
    cost: f64,
    payment_id: String,
    departure_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: BookingId(row.id),
            passenger: AccountId(row.passenger_id),
            route: RouteId(row.route_id),
            bus: BusId(row.bus_id),
            cost: row.cost,
            payment_id: row.payment_id,
            departure_date: row.departure_date,
            status: BookingStatus::from_code(&row.status)?,
        })
    }
}
