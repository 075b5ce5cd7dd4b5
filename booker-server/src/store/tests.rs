//! Repository tests against an in-memory database.

use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::{
    Account, AccountCore, AccountId, AccountKind, BookingStatus, Bus, BusId, KindTag, NewAccount,
    NewBooking, NewBus, NewRoute, Route, RouteId, StaffId,
};

async fn store() -> Store {
    Store::in_memory().await.unwrap()
}

fn new_account(email: &str, kind: AccountKind) -> NewAccount {
    NewAccount {
        core: AccountCore::new("Test", "User", email, "0712345678", "1234567").unwrap(),
        kind,
    }
}

fn driver_kind(staff_id: &str) -> AccountKind {
    AccountKind::Driver {
        staff_id: StaffId::parse(staff_id).unwrap(),
    }
}

async fn insert_driver(store: &Store, email: &str, staff_id: &str) -> Account {
    store
        .accounts()
        .insert(&new_account(email, driver_kind(staff_id)), "!")
        .await
        .unwrap()
}

async fn insert_passenger(store: &Store, email: &str) -> Account {
    store
        .accounts()
        .insert(&new_account(email, AccountKind::Passenger), "!")
        .await
        .unwrap()
}

async fn insert_bus(store: &Store, driver: AccountId, capacity: i64, booked: i64) -> Bus {
    let bus = NewBus::new(
        "Modern Coast",
        driver,
        "Nairobi",
        "Kisumu",
        capacity,
        booked,
        false,
        "Nairobi - Nakuru - Kisumu",
        1.5,
    )
    .unwrap();
    store.buses().insert(&bus).await.unwrap()
}

async fn insert_route(store: &Store) -> Route {
    let route = NewRoute::new("nairobi", "kisumu", 20.0).unwrap();
    store.routes().insert(&route).await.unwrap()
}

fn new_booking(passenger: AccountId, route: RouteId, bus: BusId) -> NewBooking {
    NewBooking::new(
        passenger,
        route,
        bus,
        0.0,
        "MPESA-1",
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
        BookingStatus::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn account_roundtrip() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;

    let fetched = store.accounts().get(driver.id).await.unwrap();
    assert_eq!(fetched, driver);
    assert_eq!(fetched.kind.tag(), KindTag::Driver);
    assert!(fetched.core.is_active);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let store = store().await;
    insert_passenger(&store, "p@example.com").await;

    let err = store
        .accounts()
        .insert(&new_account("p@example.com", AccountKind::Passenger), "!")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)), "{err:?}");
}

#[tokio::test]
async fn duplicate_staff_id_rejected() {
    let store = store().await;
    insert_driver(&store, "a@example.com", "D100").await;

    let err = store
        .accounts()
        .insert(&new_account("b@example.com", driver_kind("D100")), "!")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)), "{err:?}");
}

#[tokio::test]
async fn get_kind_hides_other_kinds() {
    let store = store().await;
    let passenger = insert_passenger(&store, "p@example.com").await;

    let err = store
        .accounts()
        .get_kind(passenger.id, KindTag::Driver)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "driver", .. }));
}

#[tokio::test]
async fn list_filters_and_orders() {
    let store = store().await;
    insert_passenger(&store, "zed@example.com").await;
    insert_passenger(&store, "amy@example.com").await;
    insert_driver(&store, "bob@example.com", "D1").await;

    let passengers = store
        .accounts()
        .list(&AccountFilter::kind(KindTag::Passenger).ordered_by_email())
        .await
        .unwrap();
    let emails: Vec<_> = passengers.iter().map(|a| a.core.email.as_str()).collect();
    assert_eq!(emails, ["amy@example.com", "zed@example.com"]);

    let found = store
        .accounts()
        .list(&AccountFilter {
            search: Some("bob".into()),
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind.tag(), KindTag::Driver);

    assert_eq!(store.accounts().count(None).await.unwrap(), 3);
    assert_eq!(
        store.accounts().count(Some(KindTag::Driver)).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn save_updates_fields() {
    let store = store().await;
    let mut account = insert_passenger(&store, "p@example.com").await;
    account.core.first_name = "Changed".into();
    account.core.is_admin = true;

    store.accounts().save(&account).await.unwrap();
    let fetched = store.accounts().get(account.id).await.unwrap();
    assert_eq!(fetched.core.first_name, "Changed");
    assert!(fetched.core.is_admin);
}

#[tokio::test]
async fn bus_requires_driver_account() {
    let store = store().await;
    let passenger = insert_passenger(&store, "p@example.com").await;

    let bus = NewBus::new("B", passenger.id, "a", "b", 10, 0, false, "r", 1.0).unwrap();
    let err = store.buses().insert(&bus).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err:?}");

    let bus = NewBus::new("B", AccountId(999), "a", "b", 10, 0, false, "r", 1.0).unwrap();
    let err = store.buses().insert(&bus).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err:?}");
}

#[tokio::test]
async fn deleting_referenced_driver_is_blocked() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let bus = insert_bus(&store, driver.id, 50, 0).await;

    let err = store
        .accounts()
        .delete(driver.id, KindTag::Driver)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Protected { .. }), "{err:?}");

    // Once the bus is gone the driver can be deleted.
    store.buses().delete(bus.id).await.unwrap();
    store
        .accounts()
        .delete(driver.id, KindTag::Driver)
        .await
        .unwrap();
    assert!(matches!(
        store.accounts().get(driver.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn restrict_violation_counts_as_protected() {
    let store = store().await;
    for sql in [
        "CREATE TABLE parents (id INTEGER PRIMARY KEY)",
        "CREATE TABLE children (parent INTEGER REFERENCES parents (id) ON DELETE RESTRICT)",
        "INSERT INTO parents (id) VALUES (1)",
        "INSERT INTO children (parent) VALUES (1)",
    ] {
        sqlx::query(sql).execute(&store.pool).await.unwrap();
    }

    let err = sqlx::query("DELETE FROM parents WHERE id = 1")
        .execute(&store.pool)
        .await
        .unwrap_err();
    assert!(matches!(
        StoreError::on_delete(err, "parent", 1),
        StoreError::Protected { entity: "parent", id: 1 }
    ));
}

#[tokio::test]
async fn deleting_referenced_route_and_bus_is_blocked() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let passenger = insert_passenger(&store, "p@example.com").await;
    let bus = insert_bus(&store, driver.id, 50, 0).await;
    let route = insert_route(&store).await;
    store
        .bookings()
        .insert(&new_booking(passenger.id, route.id, bus.id))
        .await
        .unwrap();

    assert!(matches!(
        store.routes().delete(route.id).await,
        Err(StoreError::Protected { entity: "route", .. })
    ));
    assert!(matches!(
        store.buses().delete(bus.id).await,
        Err(StoreError::Protected { entity: "bus", .. })
    ));
    assert!(matches!(
        store.accounts().delete(passenger.id, KindTag::Passenger).await,
        Err(StoreError::Protected { .. })
    ));
}

#[tokio::test]
async fn booking_references_are_checked() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let bus = insert_bus(&store, driver.id, 50, 0).await;
    let route = insert_route(&store).await;

    // A driver cannot be booked as a passenger.
    let err = store
        .bookings()
        .insert(&new_booking(driver.id, route.id, bus.id))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err:?}");

    // Dangling route.
    let passenger = insert_passenger(&store, "p@example.com").await;
    let err = store
        .bookings()
        .insert(&new_booking(passenger.id, RouteId(42), bus.id))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(_)), "{err:?}");
}

#[tokio::test]
async fn booking_roundtrip_and_cost_update() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let passenger = insert_passenger(&store, "p@example.com").await;
    let bus = insert_bus(&store, driver.id, 50, 0).await;
    let route = insert_route(&store).await;

    let mut booking = store
        .bookings()
        .insert(&new_booking(passenger.id, route.id, bus.id))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::AwaitingConfirmation);

    assert_eq!(booking.total_cost(bus.rates, route.cost), 30.0);
    store.bookings().save(&booking).await.unwrap();

    let fetched = store.bookings().get(booking.id).await.unwrap();
    assert_eq!(fetched.cost, 30.0);
    assert_eq!(fetched.departure_date, booking.departure_date);
}

#[tokio::test]
async fn duplicate_routes_allowed() {
    let store = store().await;
    let a = insert_route(&store).await;
    let b = insert_route(&store).await;
    assert_ne!(a.id, b.id);
    assert_eq!(store.routes().count().await.unwrap(), 2);
}

#[tokio::test]
async fn full_capacity_persists() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let mut bus = insert_bus(&store, driver.id, 50, 50).await;
    assert!(!bus.is_full);

    assert!(bus.full_capacity());
    store.buses().save(&bus).await.unwrap();
    assert!(store.buses().get(bus.id).await.unwrap().is_full);
}

#[tokio::test]
async fn refresh_full_keeps_reserved_seats() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let bus = insert_bus(&store, driver.id, 10, 5).await;

    // A copy read before the reservation must not be written back.
    let stale = store.buses().get(bus.id).await.unwrap();
    store.buses().reserve_seat(bus.id).await.unwrap();

    assert!(!store.buses().refresh_full(stale.id).await.unwrap());
    let stored = store.buses().get(bus.id).await.unwrap();
    assert_eq!(stored.booked.get(), 6);
    assert!(!stored.is_full);

    let full = insert_bus(&store, driver.id, 3, 2).await;
    store.buses().reserve_seat(full.id).await.unwrap();
    assert!(store.buses().refresh_full(full.id).await.unwrap());

    let err = store.buses().refresh_full(BusId(999)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "bus", id: 999 }));
}

#[tokio::test]
async fn reserve_seat_stops_at_capacity() {
    let store = store().await;
    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let bus = insert_bus(&store, driver.id, 2, 0).await;

    let after_one = store.buses().reserve_seat(bus.id).await.unwrap();
    assert_eq!(after_one.booked.get(), 1);
    assert!(!after_one.is_full);

    let after_two = store.buses().reserve_seat(bus.id).await.unwrap();
    assert_eq!(after_two.booked.get(), 2);
    assert!(after_two.is_full);

    let err = store.buses().reserve_seat(bus.id).await.unwrap_err();
    assert!(matches!(err, StoreError::CapacityExhausted(id) if id == bus.id));

    let err = store.buses().reserve_seat(BusId(999)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_overbook() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("booker.db").display());
    let store = Store::connect(&StoreConfig::new(url).with_max_connections(4))
        .await
        .unwrap();

    let driver = insert_driver(&store, "d@example.com", "D100").await;
    let bus = insert_bus(&store, driver.id, 5, 0).await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.buses().reserve_seat(bus.id).await })
        })
        .collect();

    let mut reserved = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => reserved += 1,
            Err(StoreError::CapacityExhausted(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(reserved, 5);
    let bus = store.buses().get(bus.id).await.unwrap();
    assert_eq!(bus.booked.get(), 5);
    assert!(bus.is_full);
    store.close().await;
}
