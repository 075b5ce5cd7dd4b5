//! Booking table access.

use sqlx::SqlitePool;

use crate::domain::{Booking, BookingId, KindTag, NewBooking};

use super::accounts::expect_kind;
use super::error::StoreError;
use super::rows::BookingRow;

/// Booking repository.
pub struct BookingStore<'a> {
    pub(super) pool: &'a SqlitePool,
}

impl BookingStore<'_> {
    /// Insert a booking.
    ///
    /// The passenger must be a passenger account; the route and bus must
    /// exist. Bus capacity is not consulted.
    pub async fn insert(&self, booking: &NewBooking) -> Result<Booking, StoreError> {
        let mut tx = self.pool.begin().await?;
        expect_kind(&mut tx, booking.passenger, KindTag::Passenger, "passenger").await?;

        let row: BookingRow = sqlx::query_as(
            "INSERT INTO bookings \
                (passenger_id, route_id, bus_id, cost, payment_id, departure_date, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(booking.passenger)
        .bind(booking.route)
        .bind(booking.bus)
        .bind(booking.cost)
        .bind(&booking.payment_id)
        .bind(booking.departure_date)
        .bind(booking.status.code())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Booking::try_from(row)?)
    }

    /// Fetch a booking.
    pub async fn get(&self, id: BookingId) -> Result<Booking, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(StoreError::NotFound {
            entity: "booking",
            id: id.0,
        })?;
        Ok(Booking::try_from(row)?)
    }

    /// All bookings, ordered by id.
    pub async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as("SELECT * FROM bookings ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Booking::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Write every field of a booking back.
    pub async fn save(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        expect_kind(&mut tx, booking.passenger, KindTag::Passenger, "passenger").await?;

        let result = sqlx::query(
            "UPDATE bookings SET \
                passenger_id = ?, route_id = ?, bus_id = ?, cost = ?, \
                payment_id = ?, departure_date = ?, status = ? \
             WHERE id = ?",
        )
        .bind(booking.passenger)
        .bind(booking.route)
        .bind(booking.bus)
        .bind(booking.cost)
        .bind(&booking.payment_id)
        .bind(booking.departure_date)
        .bind(booking.status.code())
        .bind(booking.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "booking",
                id: booking.id.0,
            });
        }
        tx.commit().await?;
        Ok(())
    }

    /// Delete a booking. Nothing references bookings, so this is never
    /// protected.
    pub async fn delete(&self, id: BookingId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::on_delete(e, "booking", id.0))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "booking",
                id: id.0,
            });
        }
        Ok(())
    }

    /// Number of bookings.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
