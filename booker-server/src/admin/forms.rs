//! HTML form handling for the admin console.
//!
//! Forms arrive as URL-encoded strings. Each form validates into the
//! domain types and reports problems per field so the page can be
//! re-rendered with the errors next to the inputs.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::accounts::{AccountError, AccountManager, NewUser};
use crate::domain::{
    Account, AccountCore, AccountId, AccountKind, Booking, BookingId, BookingStatus, Bus, BusId,
    DomainError, KindTag, NewBooking, NewBus, NewRoute, Route, RouteId, StaffId,
};
use crate::store::StoreError;

/// Key for errors that belong to the whole form.
pub const NON_FIELD: &str = "__all__";

/// Format of `datetime-local` inputs.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(&'static str, String)>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages for one field.
    pub fn field(&self, field: &str) -> Vec<String> {
        self.errors
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Messages for the form as a whole.
    pub fn non_field(&self) -> Vec<String> {
        self.field(NON_FIELD)
    }

    /// Attach a validation error to the field it concerns.
    pub fn add_domain(&mut self, err: &DomainError) {
        let field = match err {
            DomainError::MissingEmail | DomainError::InvalidEmail(_) => "email",
            DomainError::InvalidNationalId => "national_id",
            DomainError::InvalidPhone => "phone",
            DomainError::InvalidStaffId => "staff_id",
            DomainError::Blank(field)
            | DomainError::TooLong { field, .. }
            | DomainError::SeatsOutOfRange { field, .. }
            | DomainError::NotFinite(field) => *field,
            DomainError::UnknownStatus(_) => "status",
            DomainError::UnknownCity(_) | DomainError::UnknownKind(_) => NON_FIELD,
        };
        self.add(field, err.to_string());
    }

    fn from_domain(err: &DomainError) -> Self {
        let mut errors = Self::default();
        errors.add_domain(err);
        errors
    }
}

/// Result of submitting a form.
#[derive(Debug)]
pub enum Outcome<T> {
    Saved(T),
    Invalid(FormErrors),
}

/// Turn a store error into form errors when it is the user's to fix.
pub fn store_error(err: StoreError) -> Result<FormErrors, StoreError> {
    let mut errors = FormErrors::default();
    match err {
        StoreError::Duplicate(message) | StoreError::InvalidReference(message) => {
            errors.add(NON_FIELD, message);
        }
        StoreError::Domain(e) => errors.add_domain(&e),
        other => return Err(other),
    }
    Ok(errors)
}

fn account_error(err: AccountError) -> Result<FormErrors, AccountError> {
    match err {
        AccountError::Domain(e) => Ok(FormErrors::from_domain(&e)),
        AccountError::Store(e) => store_error(e).map_err(AccountError::Store),
        other => Err(other),
    }
}

fn require(errors: &mut FormErrors, field: &'static str, value: &str) {
    if value.is_empty() {
        errors.add(field, "This field is required.");
    }
}

fn parse_number<T: FromStr>(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required.");
        return None;
    }
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

fn parse_datetime(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, DATETIME_LOCAL) {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            errors.add(field, "Enter a valid date/time.");
            None
        }
    }
}

/// HTML checkboxes are present when ticked and absent otherwise.
fn checked(value: &Option<String>) -> bool {
    value.is_some()
}

// ============================================================================
// Accounts
// ============================================================================

/// New account with a confirmed password. `staff_id` is only read for
/// drivers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserCreationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub staff_id: String,
    pub password1: String,
    pub password2: String,
}

impl UserCreationForm {
    /// Check the password pair, and the staff id of a driver.
    pub fn clean(&self, kind: KindTag) -> FormErrors {
        let mut errors = FormErrors::default();
        if kind == KindTag::Driver {
            require(&mut errors, "staff_id", self.staff_id.trim());
        }
        require(&mut errors, "password1", &self.password1);
        require(&mut errors, "password2", &self.password2);
        if !self.password1.is_empty()
            && !self.password2.is_empty()
            && self.password1 != self.password2
        {
            errors.add("password2", "Passwords don't match");
        }
        errors
    }

    /// Validate and create an account of `kind` with `password1`.
    pub async fn save(
        &self,
        accounts: &AccountManager,
        kind: KindTag,
    ) -> Result<Outcome<Account>, AccountError> {
        let errors = self.clean(kind);
        if !errors.is_empty() {
            return Ok(Outcome::Invalid(errors));
        }

        let user = NewUser {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            national_id: self.national_id.clone(),
        };
        let password = Some(self.password1.as_str());
        let created = match kind {
            KindTag::Basic => accounts.create_user(&user, password).await,
            KindTag::Passenger => accounts.create_passenger(&user, password).await,
            KindTag::Driver => accounts.create_driver(&user, &self.staff_id, password).await,
        };
        match created {
            Ok(account) => Ok(Outcome::Saved(account)),
            Err(e) => account_error(e).map(Outcome::Invalid),
        }
    }
}

/// Edits to an existing account. The password is not editable here and the
/// kind is fixed; `staff_id` only applies to drivers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserChangeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub staff_id: String,
    pub is_active: Option<String>,
    pub is_admin: Option<String>,
}

impl UserChangeForm {
    pub fn from_account(account: &Account) -> Self {
        let core = &account.core;
        Self {
            first_name: core.first_name.clone(),
            last_name: core.last_name.clone(),
            email: core.email.to_string(),
            phone: core.phone.to_string(),
            national_id: core.national_id.to_string(),
            staff_id: account.kind.staff_id().map(StaffId::to_string).unwrap_or_default(),
            is_active: core.is_active.then(|| "on".to_string()),
            is_admin: core.is_admin.then(|| "on".to_string()),
        }
    }

    /// Validate and copy onto `account`.
    pub fn apply(&self, account: &mut Account) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        let core = match AccountCore::new(
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.national_id,
        ) {
            Ok(core) => Some(core),
            Err(e) => {
                errors.add_domain(&e);
                None
            }
        };
        let kind = match &account.kind {
            AccountKind::Driver { .. } => match StaffId::parse(&self.staff_id) {
                Ok(staff_id) => Some(AccountKind::Driver { staff_id }),
                Err(e) => {
                    errors.add_domain(&e);
                    None
                }
            },
            other => Some(other.clone()),
        };

        let (Some(mut core), Some(kind)) = (core, kind) else {
            return Err(errors);
        };
        core.is_active = checked(&self.is_active);
        core.is_admin = checked(&self.is_admin);
        account.core = core;
        account.kind = kind;
        Ok(())
    }
}

// ============================================================================
// Buses, routes and bookings
// ============================================================================

/// Every bus field. The driver is selected by account id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusForm {
    pub bus_name: String,
    pub driver: String,
    pub source: String,
    pub destination: String,
    pub capacity: String,
    pub booked: String,
    pub is_full: Option<String>,
    pub routes: String,
    pub rates: String,
}

impl BusForm {
    pub fn from_bus(bus: &Bus) -> Self {
        Self {
            bus_name: bus.bus_name.clone(),
            driver: bus.driver.to_string(),
            source: bus.source.clone(),
            destination: bus.destination.clone(),
            capacity: bus.capacity.to_string(),
            booked: bus.booked.to_string(),
            is_full: bus.is_full.then(|| "on".to_string()),
            routes: bus.routes.clone(),
            rates: bus.rates.to_string(),
        }
    }

    pub fn clean(&self) -> Result<NewBus, FormErrors> {
        let mut errors = FormErrors::default();
        let whole = "Enter a whole number.";
        let driver = parse_number(&mut errors, "driver", &self.driver, "Select a valid choice.");
        let capacity = parse_number(&mut errors, "capacity", &self.capacity, whole);
        let booked = parse_number(&mut errors, "booked", &self.booked, whole);
        let rates = parse_number(&mut errors, "rates", &self.rates, "Enter a number.");

        let (Some(driver), Some(capacity), Some(booked), Some(rates)) =
            (driver, capacity, booked, rates)
        else {
            return Err(errors);
        };
        NewBus::new(
            &self.bus_name,
            AccountId(driver),
            &self.source,
            &self.destination,
            capacity,
            booked,
            checked(&self.is_full),
            &self.routes,
            rates,
        )
        .map_err(|e| FormErrors::from_domain(&e))
    }

    /// Validate as an edit of the bus with this id.
    pub fn clean_for(&self, id: BusId) -> Result<Bus, FormErrors> {
        Ok(self.clean()?.with_id(id))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouteForm {
    pub source: String,
    pub destination: String,
    pub cost: String,
}

impl RouteForm {
    pub fn from_route(route: &Route) -> Self {
        Self {
            source: route.source.as_str().to_string(),
            destination: route.destination.as_str().to_string(),
            cost: route.cost.to_string(),
        }
    }

    pub fn clean(&self) -> Result<NewRoute, FormErrors> {
        let mut errors = FormErrors::default();
        let cost = parse_number::<f64>(&mut errors, "cost", &self.cost, "Enter a number.");
        let Some(cost) = cost else {
            return Err(errors);
        };
        NewRoute::new(&self.source, &self.destination, cost)
            .map_err(|e| FormErrors::from_domain(&e))
    }

    pub fn clean_for(&self, id: RouteId) -> Result<Route, FormErrors> {
        Ok(self.clean()?.with_id(id))
    }
}

/// Every booking field. Relations are selected by id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub passenger: String,
    pub route: String,
    pub bus: String,
    pub cost: String,
    pub payment_id: String,
    pub departure_date: String,
    pub status: String,
}

impl BookingForm {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            passenger: booking.passenger.to_string(),
            route: booking.route.to_string(),
            bus: booking.bus.to_string(),
            cost: booking.cost.to_string(),
            payment_id: booking.payment_id.clone(),
            departure_date: booking.departure_date.format(DATETIME_LOCAL).to_string(),
            status: booking.status.as_str().to_string(),
        }
    }

    pub fn clean(&self) -> Result<NewBooking, FormErrors> {
        let mut errors = FormErrors::default();
        let choice = "Select a valid choice.";
        let passenger = parse_number::<i64>(&mut errors, "passenger", &self.passenger, choice);
        let route = parse_number::<i64>(&mut errors, "route", &self.route, choice);
        let bus = parse_number::<i64>(&mut errors, "bus", &self.bus, choice);
        let cost = parse_number::<f64>(&mut errors, "cost", &self.cost, "Enter a number.");
        let departure_date = parse_datetime(&mut errors, "departure_date", &self.departure_date);
        let status = match BookingStatus::parse(&self.status) {
            Ok(status) => Some(status),
            Err(e) => {
                errors.add_domain(&e);
                None
            }
        };

        let (
            Some(passenger),
            Some(route),
            Some(bus),
            Some(cost),
            Some(departure_date),
            Some(status),
        ) = (passenger, route, bus, cost, departure_date, status)
        else {
            return Err(errors);
        };
        NewBooking::new(
            AccountId(passenger),
            RouteId(route),
            BusId(bus),
            cost,
            &self.payment_id,
            departure_date,
            status,
        )
        .map_err(|e| FormErrors::from_domain(&e))
    }

    pub fn clean_for(&self, id: BookingId) -> Result<Booking, FormErrors> {
        Ok(self.clean()?.with_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn creation(password1: &str, password2: &str) -> UserCreationForm {
        UserCreationForm {
            first_name: "Jane".into(),
            last_name: "Wanjiru".into(),
            email: "jane@example.com".into(),
            phone: "0712345678".into(),
            national_id: "1234567".into(),
            staff_id: String::new(),
            password1: password1.into(),
            password2: password2.into(),
        }
    }

    #[test]
    fn mismatched_passwords() {
        let errors = creation("one", "two").clean(KindTag::Basic);
        assert_eq!(errors.field("password2"), ["Passwords don't match"]);
    }

    #[test]
    fn missing_passwords() {
        let errors = creation("", "").clean(KindTag::Basic);
        assert_eq!(errors.field("password1"), ["This field is required."]);
        assert_eq!(errors.field("password2"), ["This field is required."]);
    }

    #[tokio::test]
    async fn mismatch_creates_nothing() {
        let store = Store::in_memory().await.unwrap();
        let accounts = AccountManager::new(store.clone());

        let outcome = creation("one", "two").save(&accounts, KindTag::Basic).await.unwrap();
        assert!(matches!(outcome, Outcome::Invalid(_)));
        assert_eq!(store.accounts().count(None).await.unwrap(), 0);

        let outcome = creation("same", "same").save(&accounts, KindTag::Basic).await.unwrap();
        let Outcome::Saved(account) = outcome else {
            panic!("expected the account to be created");
        };
        assert!(accounts.authenticate("jane@example.com", "same").await.unwrap().is_some());
        assert!(!account.core.is_admin);
    }

    #[tokio::test]
    async fn validation_errors_land_on_fields() {
        let store = Store::in_memory().await.unwrap();
        let accounts = AccountManager::new(store);

        let mut form = creation("pw", "pw");
        form.national_id = "123456789".into();
        let Outcome::Invalid(errors) = form.save(&accounts, KindTag::Basic).await.unwrap() else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.field("national_id"), ["Invalid ID number"]);
    }

    #[test]
    fn change_form_checkboxes() {
        let form = UserChangeForm {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@example.com".into(),
            phone: "07".into(),
            national_id: "1".into(),
            staff_id: String::new(),
            is_active: None,
            is_admin: Some("on".into()),
        };
        let mut account = Account {
            id: AccountId(1),
            core: AccountCore::new("X", "Y", "x@example.com", "07", "2").unwrap(),
            kind: AccountKind::Basic,
            password: "!".into(),
            last_login: None,
        };
        form.apply(&mut account).unwrap();
        assert!(!account.core.is_active);
        assert!(account.core.is_admin);
        assert_eq!(account.core.email.as_str(), "a@example.com");
    }

    #[tokio::test]
    async fn driver_needs_a_staff_id() {
        let store = Store::in_memory().await.unwrap();
        let accounts = AccountManager::new(store.clone());

        let mut form = creation("pw", "pw");
        assert!(form.clean(KindTag::Passenger).is_empty());
        let Outcome::Invalid(errors) = form.save(&accounts, KindTag::Driver).await.unwrap() else {
            panic!("expected a missing staff id");
        };
        assert_eq!(errors.field("staff_id"), ["This field is required."]);
        assert_eq!(store.accounts().count(None).await.unwrap(), 0);

        form.staff_id = "D100".into();
        let Outcome::Saved(driver) = form.save(&accounts, KindTag::Driver).await.unwrap() else {
            panic!("expected the driver to be created");
        };
        assert_eq!(driver.kind.staff_id().map(StaffId::as_str), Some("D100"));
        assert_eq!(UserChangeForm::from_account(&driver).staff_id, "D100");
    }

    #[test]
    fn change_form_edits_driver_staff_id() {
        let mut driver = Account {
            id: AccountId(1),
            core: AccountCore::new("X", "Y", "x@example.com", "07", "2").unwrap(),
            kind: AccountKind::Driver {
                staff_id: StaffId::parse("D1").unwrap(),
            },
            password: "!".into(),
            last_login: None,
        };
        let mut form = UserChangeForm::from_account(&driver);

        form.staff_id = "  ".into();
        let errors = form.apply(&mut driver).unwrap_err();
        assert_eq!(errors.field("staff_id").len(), 1);
        assert_eq!(driver.kind.staff_id().map(StaffId::as_str), Some("D1"));

        form.staff_id = "D2".into();
        form.apply(&mut driver).unwrap();
        assert_eq!(driver.kind.staff_id().map(StaffId::as_str), Some("D2"));
    }

    #[test]
    fn bus_form_reports_bad_numbers() {
        let form = BusForm {
            bus_name: "B".into(),
            driver: "1".into(),
            source: "a".into(),
            destination: "b".into(),
            capacity: "lots".into(),
            booked: "".into(),
            is_full: None,
            routes: "r".into(),
            rates: "1.0".into(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.field("capacity"), ["Enter a whole number."]);
        assert_eq!(errors.field("booked"), ["This field is required."]);
    }

    #[test]
    fn booking_form_accepts_datetime_local() {
        let form = BookingForm {
            passenger: "1".into(),
            route: "2".into(),
            bus: "3".into(),
            cost: "30".into(),
            payment_id: "MP1".into(),
            departure_date: "2024-03-15T08:00".into(),
            status: "booked".into(),
        };
        let booking = form.clean().unwrap();
        assert_eq!(booking.departure_date.to_rfc3339(), "2024-03-15T08:00:00+00:00");
        assert_eq!(booking.status, BookingStatus::Booked);
    }

    #[test]
    fn route_form_unknown_city() {
        let form = RouteForm {
            source: "nairobi".into(),
            destination: "paris".into(),
            cost: "1".into(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.non_field(), ["\"paris\" is not a valid choice"]);
    }
}
