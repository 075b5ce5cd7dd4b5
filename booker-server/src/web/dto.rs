//! Data transfer objects for the JSON API.
//!
//! Output bodies carry a `url` for the record and URLs for its relations.
//! Write bodies have every field optional so one type serves create, full
//! update and partial update; `resolve` decides which absences are errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::NewUser;
use crate::domain::{
    Account, AccountId, Booking, BookingId, BookingStatus, Bus, BusId, City, DEFAULT_RATES, Email,
    KindTag, NationalId, NewBooking, NewBus, NewRoute, Phone, Route, RouteId, StaffId,
};

use super::error::AppError;
use super::links::{Links, Resource, resolve};

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Collection URLs, served at `/`.
#[derive(Debug, Serialize)]
pub struct ApiRoot {
    pub passenger: String,
    pub driver: String,
    pub bus: String,
    pub routes: String,
    pub booking: String,
}

impl ApiRoot {
    pub fn new(links: &Links) -> Self {
        Self {
            passenger: links.collection(Resource::Passenger),
            driver: links.collection(Resource::Driver),
            bus: links.collection(Resource::Bus),
            routes: links.collection(Resource::Routes),
            booking: links.collection(Resource::Booking),
        }
    }
}

/// Response from `POST /bus/{id}/full_capacity/`.
#[derive(Debug, Serialize)]
pub struct FullCapacityResponse {
    pub is_full: bool,
}

/// Response from `POST /booking/{id}/total_cost/`.
#[derive(Debug, Serialize)]
pub struct TotalCostResponse {
    pub total_cost: f64,
}

// ============================================================================
// Output bodies
// ============================================================================

/// A passenger or driver.
///
/// The password hash is never included.
#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub url: String,
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub national_id: NationalId,
    pub is_active: bool,
    pub is_admin: bool,
    pub last_login: Option<DateTime<Utc>>,
    /// Drivers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
}

impl AccountBody {
    pub fn new(links: &Links, resource: Resource, account: &Account) -> Self {
        let core = &account.core;
        Self {
            url: links.record(resource, account.id),
            id: account.id,
            first_name: core.first_name.clone(),
            last_name: core.last_name.clone(),
            email: core.email.clone(),
            phone: core.phone.clone(),
            national_id: core.national_id.clone(),
            is_active: core.is_active,
            is_admin: core.is_admin,
            last_login: account.last_login,
            staff_id: account.kind.staff_id().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusBody {
    pub url: String,
    pub id: BusId,
    pub bus_name: String,
    pub driver: String,
    pub source: String,
    pub destination: String,
    pub capacity: u8,
    pub booked: u8,
    pub is_full: bool,
    pub routes: String,
    pub rates: f64,
}

impl BusBody {
    pub fn new(links: &Links, bus: &Bus) -> Self {
        Self {
            url: links.record(Resource::Bus, bus.id),
            id: bus.id,
            bus_name: bus.bus_name.clone(),
            driver: links.record(Resource::Driver, bus.driver),
            source: bus.source.clone(),
            destination: bus.destination.clone(),
            capacity: bus.capacity.get(),
            booked: bus.booked.get(),
            is_full: bus.is_full,
            routes: bus.routes.clone(),
            rates: bus.rates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteBody {
    pub url: String,
    pub id: RouteId,
    pub source: City,
    pub destination: City,
    pub cost: f64,
}

impl RouteBody {
    pub fn new(links: &Links, route: &Route) -> Self {
        Self {
            url: links.record(Resource::Routes, route.id),
            id: route.id,
            source: route.source,
            destination: route.destination,
            cost: route.cost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingBody {
    pub url: String,
    pub id: BookingId,
    pub passenger: String,
    pub route: String,
    pub bus: String,
    pub cost: f64,
    pub payment_id: String,
    pub departure_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl BookingBody {
    pub fn new(links: &Links, booking: &Booking) -> Self {
        Self {
            url: links.record(Resource::Booking, booking.id),
            id: booking.id,
            passenger: links.record(Resource::Passenger, booking.passenger),
            route: links.record(Resource::Routes, booking.route),
            bus: links.record(Resource::Bus, booking.bus),
            cost: booking.cost,
            payment_id: booking.payment_id.clone(),
            departure_date: booking.departure_date,
            status: booking.status,
        }
    }
}

// ============================================================================
// Write bodies
// ============================================================================

/// Value of a field the client must send, except on a partial update where
/// the current value stands in.
fn required<T>(value: Option<T>, current: Option<T>, partial: bool, field: &str) -> Result<T, AppError> {
    match (value, current) {
        (Some(v), _) => Ok(v),
        (None, Some(c)) if partial => Ok(c),
        _ => Err(AppError::missing(field)),
    }
}

/// Value of a field with a default. An update keeps the current value.
fn optional<T>(value: Option<T>, current: Option<T>, default: T) -> T {
    value.or(current).unwrap_or(default)
}

/// Resolve an optional hyperlink field.
fn link(value: Option<&str>, resource: Resource) -> Result<Option<i64>, AppError> {
    Ok(value.map(|url| resolve(url, resource)).transpose()?)
}

/// Passenger or driver fields.
#[derive(Debug, Default, Deserialize)]
pub struct AccountWrite {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    /// Plain text; hashed before storage.
    pub password: Option<String>,
    /// Drivers only
    pub staff_id: Option<String>,
}

/// Account fields after merging with the current record.
#[derive(Debug)]
pub struct AccountFields {
    pub user: NewUser,
    pub is_active: bool,
    pub is_admin: bool,
    pub staff_id: Option<String>,
    pub password: Option<String>,
}

impl AccountWrite {
    pub fn resolve(
        self,
        kind: KindTag,
        current: Option<&Account>,
        partial: bool,
    ) -> Result<AccountFields, AppError> {
        let core = current.map(|a| &a.core);
        let user = NewUser {
            first_name: required(
                self.first_name,
                core.map(|c| c.first_name.clone()),
                partial,
                "first_name",
            )?,
            last_name: required(
                self.last_name,
                core.map(|c| c.last_name.clone()),
                partial,
                "last_name",
            )?,
            email: required(
                self.email,
                core.map(|c| c.email.to_string()),
                partial,
                "email",
            )?,
            phone: required(
                self.phone,
                core.map(|c| c.phone.to_string()),
                partial,
                "phone",
            )?,
            national_id: required(
                self.national_id,
                core.map(|c| c.national_id.to_string()),
                partial,
                "national_id",
            )?,
        };

        let staff_id = match kind {
            KindTag::Driver => Some(required(
                self.staff_id,
                current
                    .and_then(|a| a.kind.staff_id())
                    .map(|s| s.to_string()),
                partial,
                "staff_id",
            )?),
            KindTag::Basic | KindTag::Passenger => None,
        };

        Ok(AccountFields {
            user,
            is_active: optional(self.is_active, core.map(|c| c.is_active), true),
            is_admin: optional(self.is_admin, core.map(|c| c.is_admin), false),
            staff_id,
            password: self.password,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BusWrite {
    pub bus_name: Option<String>,
    /// Driver URL
    pub driver: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub capacity: Option<i64>,
    pub booked: Option<i64>,
    pub is_full: Option<bool>,
    pub routes: Option<String>,
    pub rates: Option<f64>,
}

impl BusWrite {
    pub fn resolve(self, current: Option<&Bus>, partial: bool) -> Result<NewBus, AppError> {
        let driver = link(self.driver.as_deref(), Resource::Driver)?;
        let bus_name = required(
            self.bus_name,
            current.map(|b| b.bus_name.clone()),
            partial,
            "bus_name",
        )?;
        let driver = required(driver, current.map(|b| b.driver.0), partial, "driver")?;
        let source = required(
            self.source,
            current.map(|b| b.source.clone()),
            partial,
            "source",
        )?;
        let destination = required(
            self.destination,
            current.map(|b| b.destination.clone()),
            partial,
            "destination",
        )?;
        let capacity = required(
            self.capacity,
            current.map(|b| i64::from(b.capacity.get())),
            partial,
            "capacity",
        )?;
        let booked = required(
            self.booked,
            current.map(|b| i64::from(b.booked.get())),
            partial,
            "booked",
        )?;
        let routes = required(
            self.routes,
            current.map(|b| b.routes.clone()),
            partial,
            "routes",
        )?;

        Ok(NewBus::new(
            &bus_name,
            AccountId(driver),
            &source,
            &destination,
            capacity,
            booked,
            optional(self.is_full, current.map(|b| b.is_full), false),
            &routes,
            optional(self.rates, current.map(|b| b.rates), DEFAULT_RATES),
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteWrite {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub cost: Option<f64>,
}

impl RouteWrite {
    pub fn resolve(self, current: Option<&Route>, partial: bool) -> Result<NewRoute, AppError> {
        let source = required(
            self.source,
            current.map(|r| r.source.as_str().to_string()),
            partial,
            "source",
        )?;
        let destination = required(
            self.destination,
            current.map(|r| r.destination.as_str().to_string()),
            partial,
            "destination",
        )?;
        let cost = required(self.cost, current.map(|r| r.cost), partial, "cost")?;

        Ok(NewRoute::new(&source, &destination, cost)?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingWrite {
    /// Passenger URL
    pub passenger: Option<String>,
    /// Route URL
    pub route: Option<String>,
    /// Bus URL
    pub bus: Option<String>,
    pub cost: Option<f64>,
    pub payment_id: Option<String>,
    pub departure_date: Option<DateTime<Utc>>,
    pub status: Option<BookingStatus>,
}

impl BookingWrite {
    pub fn resolve(self, current: Option<&Booking>, partial: bool) -> Result<NewBooking, AppError> {
        let passenger = link(self.passenger.as_deref(), Resource::Passenger)?;
        let route = link(self.route.as_deref(), Resource::Routes)?;
        let bus = link(self.bus.as_deref(), Resource::Bus)?;

        let passenger = required(
            passenger,
            current.map(|b| b.passenger.0),
            partial,
            "passenger",
        )?;
        let route = required(route, current.map(|b| b.route.0), partial, "route")?;
        let bus = required(bus, current.map(|b| b.bus.0), partial, "bus")?;
        let cost = required(self.cost, current.map(|b| b.cost), partial, "cost")?;
        let payment_id = required(
            self.payment_id,
            current.map(|b| b.payment_id.clone()),
            partial,
            "payment_id",
        )?;
        let departure_date = required(
            self.departure_date,
            current.map(|b| b.departure_date),
            partial,
            "departure_date",
        )?;

        Ok(NewBooking::new(
            AccountId(passenger),
            RouteId(route),
            BusId(bus),
            cost,
            &payment_id,
            departure_date,
            optional(self.status, current.map(|b| b.status), BookingStatus::default()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::domain::{AccountCore, AccountKind, Seats};

    fn links() -> Links {
        Links::new("http://testserver")
    }

    fn bus() -> Bus {
        NewBus::new("Coast", AccountId(4), "Nairobi", "Mombasa", 50, 10, false, "A-B", 1.5)
            .unwrap()
            .with_id(BusId(2))
    }

    #[test]
    fn account_body_hides_password() {
        let account = Account {
            id: AccountId(3),
            core: AccountCore::new("J", "W", "j@example.com", "07", "1").unwrap(),
            kind: AccountKind::Driver {
                staff_id: StaffId::parse("D100").unwrap(),
            },
            password: "$argon2id$secret".into(),
            last_login: None,
        };
        let body = AccountBody::new(&links(), Resource::Driver, &account);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["url"], "http://testserver/driver/3/");
        assert_eq!(value["staff_id"], "D100");
        assert!(value.get("password").is_none());

        let passenger = Account {
            kind: AccountKind::Passenger,
            ..account
        };
        let value =
            serde_json::to_value(AccountBody::new(&links(), Resource::Passenger, &passenger))
                .unwrap();
        assert!(value.get("staff_id").is_none());
    }

    #[test]
    fn bus_body_links_driver() {
        let value = serde_json::to_value(BusBody::new(&links(), &bus())).unwrap();
        assert_eq!(value["url"], "http://testserver/bus/2/");
        assert_eq!(value["driver"], "http://testserver/driver/4/");
        assert_eq!(value["capacity"], 50);
    }

    #[test]
    fn booking_body_uses_status_names() {
        let booking = NewBooking::new(
            AccountId(1),
            RouteId(2),
            BusId(3),
            30.0,
            "MP1",
            Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
            BookingStatus::Booked,
        )
        .unwrap()
        .with_id(BookingId(9));
        let value = serde_json::to_value(BookingBody::new(&links(), &booking)).unwrap();
        assert_eq!(value["status"], "booked");
        assert_eq!(value["route"], "http://testserver/routes/2/");
        assert_eq!(value["departure_date"], "2024-03-15T08:00:00Z");
    }

    #[test]
    fn create_requires_fields() {
        let write: BusWrite = serde_json::from_value(json!({ "bus_name": "X" })).unwrap();
        let err = write.resolve(None, false).unwrap_err();
        assert_eq!(err.message(), "driver: This field is required.");
    }

    #[test]
    fn create_applies_defaults() {
        let write: BusWrite = serde_json::from_value(json!({
            "bus_name": "X",
            "driver": "http://testserver/driver/4/",
            "source": "a",
            "destination": "b",
            "capacity": 10,
            "booked": 0,
            "routes": "a-b",
        }))
        .unwrap();
        let bus = write.resolve(None, false).unwrap();
        assert_eq!(bus.driver, AccountId(4));
        assert_eq!(bus.rates, DEFAULT_RATES);
        assert!(!bus.is_full);
    }

    #[test]
    fn partial_update_keeps_current() {
        let current = bus();
        let write: BusWrite = serde_json::from_value(json!({ "booked": 50 })).unwrap();
        let updated = write.resolve(Some(&current), true).unwrap();
        assert_eq!(updated.booked, Seats::new("booked", 50).unwrap());
        assert_eq!(updated.bus_name, "Coast");
        assert_eq!(updated.rates, 1.5);

        // A full update must restate required fields.
        let write: BusWrite = serde_json::from_value(json!({ "booked": 50 })).unwrap();
        assert!(write.resolve(Some(&current), false).is_err());
    }

    #[test]
    fn relation_must_point_at_right_resource() {
        let write: BusWrite =
            serde_json::from_value(json!({ "driver": "http://testserver/passenger/4/" })).unwrap();
        let err = write.resolve(Some(&bus()), true).unwrap_err();
        assert!(err.message().contains("Incorrect URL match"));
    }

    #[test]
    fn route_rejects_unknown_city() {
        let write: RouteWrite = serde_json::from_value(json!({
            "source": "nairobi",
            "destination": "london",
            "cost": 1.0,
        }))
        .unwrap();
        let err = write.resolve(None, false).unwrap_err();
        assert_eq!(err.message(), "\"london\" is not a valid choice");
    }

    #[test]
    fn driver_needs_staff_id() {
        let write: AccountWrite = serde_json::from_value(json!({
            "first_name": "J",
            "last_name": "W",
            "email": "j@example.com",
            "phone": "07",
            "national_id": "1",
        }))
        .unwrap();
        let err = write.resolve(KindTag::Driver, None, false).unwrap_err();
        assert_eq!(err.message(), "staff_id: This field is required.");
    }
}
