//! Route table access.

use sqlx::SqlitePool;

use crate::domain::{NewRoute, Route, RouteId};

use super::error::StoreError;
use super::rows::RouteRow;

/// Route repository.
pub struct RouteStore<'a> {
    pub(super) pool: &'a SqlitePool,
}

impl RouteStore<'_> {
    /// Insert a route. Duplicate source/destination pairs are allowed.
    pub async fn insert(&self, route: &NewRoute) -> Result<Route, StoreError> {
        let row: RouteRow = sqlx::query_as(
            "INSERT INTO routes (source, destination, cost) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(route.source.as_str())
        .bind(route.destination.as_str())
        .bind(route.cost)
        .fetch_one(self.pool)
        .await?;

        Ok(Route::try_from(row)?)
    }

    /// Fetch a route.
    pub async fn get(&self, id: RouteId) -> Result<Route, StoreError> {
        let row: Option<RouteRow> = sqlx::query_as("SELECT * FROM routes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(StoreError::NotFound {
            entity: "route",
            id: id.0,
        })?;
        Ok(Route::try_from(row)?)
    }

    /// All routes, ordered by id.
    pub async fn list(&self) -> Result<Vec<Route>, StoreError> {
        let rows: Vec<RouteRow> = sqlx::query_as("SELECT * FROM routes ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Route::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Write every field of a route back.
    pub async fn save(&self, route: &Route) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE routes SET source = ?, destination = ?, cost = ? WHERE id = ?")
                .bind(route.source.as_str())
                .bind(route.destination.as_str())
                .bind(route.cost)
                .bind(route.id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "route",
                id: route.id.0,
            });
        }
        Ok(())
    }

    /// Delete a route.
    ///
    /// Fails with [`StoreError::Protected`] while bookings reference it.
    pub async fn delete(&self, id: RouteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM routes WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::on_delete(e, "route", id.0))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "route",
                id: id.0,
            });
        }
        Ok(())
    }

    /// Number of routes.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM routes")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
