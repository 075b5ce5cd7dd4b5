//! Storage error types.

use sqlx::error::ErrorKind;

use crate::domain::{BusId, DomainError};

/// Extended result code SQLite uses for `RESTRICT` foreign key actions.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row with this id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique column already holds this value
    #[error("duplicate value: {0}")]
    Duplicate(String),

    /// Delete refused because other rows reference this one
    #[error("cannot delete {entity} {id}: it is referenced by other records")]
    Protected { entity: &'static str, id: i64 },

    /// A reference points at a missing row or a row of the wrong kind
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Every seat on the bus is taken
    #[error("bus {0} has no free seats")]
    CapacityExhausted(BusId),

    /// A stored row failed domain validation
    #[error("corrupt row: {0}")]
    Domain(#[from] DomainError),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Schema migration failed
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.kind() {
                ErrorKind::UniqueViolation => {
                    return StoreError::Duplicate(unique_column(db.message()));
                }
                ErrorKind::ForeignKeyViolation => {
                    return StoreError::InvalidReference(
                        "referenced record does not exist".to_string(),
                    );
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    /// Map an error from a `DELETE`, where a foreign key violation means
    /// the row is still referenced.
    ///
    /// `ON DELETE RESTRICT` actions report `SQLITE_CONSTRAINT_TRIGGER`
    /// rather than `SQLITE_CONSTRAINT_FOREIGNKEY`, so both count.
    pub(crate) fn on_delete(err: sqlx::Error, entity: &'static str, id: i64) -> Self {
        if let sqlx::Error::Database(db) = &err
            && (db.kind() == ErrorKind::ForeignKeyViolation
                || db.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER))
        {
            return StoreError::Protected { entity, id };
        }
        StoreError::from(err)
    }
}

/// Pull `table.column` out of SQLite's `UNIQUE constraint failed: ...`.
fn unique_column(message: &str) -> String {
    message
        .rsplit_once(": ")
        .map(|(_, column)| format!("{column} already exists"))
        .unwrap_or_else(|| message.to_string())
}
