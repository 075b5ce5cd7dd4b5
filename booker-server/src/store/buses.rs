//! Bus table access.

use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::{Bus, BusId, KindTag, NewBus};

use super::accounts::expect_kind;
use super::error::StoreError;
use super::rows::BusRow;

/// Bus repository.
pub struct BusStore<'a> {
    pub(super) pool: &'a SqlitePool,
}

impl BusStore<'_> {
    /// Insert a bus. The driver must be a driver account.
    pub async fn insert(&self, bus: &NewBus) -> Result<Bus, StoreError> {
        let mut tx = self.pool.begin().await?;
        expect_kind(&mut tx, bus.driver, KindTag::Driver, "driver").await?;

        let row: BusRow = sqlx::query_as(
            "INSERT INTO buses \
                (bus_name, driver_id, source, destination, capacity, booked, is_full, routes, rates) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(&bus.bus_name)
        .bind(bus.driver)
        .bind(&bus.source)
        .bind(&bus.destination)
        .bind(i64::from(bus.capacity.get()))
        .bind(i64::from(bus.booked.get()))
        .bind(bus.is_full)
        .bind(&bus.routes)
        .bind(bus.rates)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Bus::try_from(row)?)
    }

    /// Fetch a bus.
    pub async fn get(&self, id: BusId) -> Result<Bus, StoreError> {
        let row: Option<BusRow> = sqlx::query_as("SELECT * FROM buses WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(StoreError::NotFound {
            entity: "bus",
            id: id.0,
        })?;
        Ok(Bus::try_from(row)?)
    }

    /// All buses, ordered by id.
    pub async fn list(&self) -> Result<Vec<Bus>, StoreError> {
        let rows: Vec<BusRow> = sqlx::query_as("SELECT * FROM buses ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Bus::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Write every field of a bus back.
    pub async fn save(&self, bus: &Bus) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        expect_kind(&mut tx, bus.driver, KindTag::Driver, "driver").await?;

        let result = sqlx::query(
            "UPDATE buses SET \
                bus_name = ?, driver_id = ?, source = ?, destination = ?, \
                capacity = ?, booked = ?, is_full = ?, routes = ?, rates = ? \
             WHERE id = ?",
        )
        .bind(&bus.bus_name)
        .bind(bus.driver)
        .bind(&bus.source)
        .bind(&bus.destination)
        .bind(i64::from(bus.capacity.get()))
        .bind(i64::from(bus.booked.get()))
        .bind(bus.is_full)
        .bind(&bus.routes)
        .bind(bus.rates)
        .bind(bus.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "bus",
                id: bus.id.0,
            });
        }
        tx.commit().await?;
        Ok(())
    }

    /// Take one seat if any is free.
    ///
    /// The check and the increment are a single statement, so two callers
    /// racing for the last seat cannot both get it. The full flag is
    /// recomputed in the same statement.
    pub async fn reserve_seat(&self, id: BusId) -> Result<Bus, StoreError> {
        let row: Option<BusRow> = sqlx::query_as(
            "UPDATE buses SET booked = booked + 1, is_full = (booked + 1 = capacity) \
             WHERE id = ? AND booked < capacity \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let bus = Bus::try_from(row)?;
                debug!(bus = %id, booked = %bus.booked, capacity = %bus.capacity, "seat reserved");
                Ok(bus)
            }
            // Distinguish a full bus from a missing one.
            None => {
                self.get(id).await?;
                Err(StoreError::CapacityExhausted(id))
            }
        }
    }

    /// Recompute and store the full flag, returning it.
    ///
    /// Only `is_full` is written, and it is computed from the stored seat
    /// counts, so a concurrent `reserve_seat` is never undone. Matches
    /// [`Bus::full_capacity`].
    pub async fn refresh_full(&self, id: BusId) -> Result<bool, StoreError> {
        let is_full: Option<bool> = sqlx::query_scalar(
            "UPDATE buses SET is_full = (booked = capacity) WHERE id = ? RETURNING is_full",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        is_full.ok_or(StoreError::NotFound {
            entity: "bus",
            id: id.0,
        })
    }

    ///
    /// Fails with [`StoreError::Protected`] while bookings reference it.
    pub async fn delete(&self, id: BusId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM buses WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::on_delete(e, "bus", id.0))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "bus",
                id: id.0,
            });
        }
        Ok(())
    }

    /// Number of buses.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buses")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
