//! Account table access.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::domain::{Account, AccountId, Email, KindTag, NewAccount};

use super::error::StoreError;
use super::rows::AccountRow;

/// Filters for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Only accounts of this kind.
    pub kind: Option<KindTag>,
    /// Only administrators (`true`) or non-administrators (`false`).
    pub is_admin: Option<bool>,
    /// Substring match on email or national id.
    pub search: Option<String>,
    /// Order by email instead of id.
    pub order_by_email: bool,
}

impl AccountFilter {
    /// All accounts of one kind, ordered by id.
    pub fn kind(kind: KindTag) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Order by email.
    pub fn ordered_by_email(mut self) -> Self {
        self.order_by_email = true;
        self
    }
}

/// Account repository.
pub struct AccountStore<'a> {
    pub(super) pool: &'a SqlitePool,
}

impl AccountStore<'_> {
    /// Insert a new account with an already-encoded password.
    pub async fn insert(&self, account: &NewAccount, password: &str) -> Result<Account, StoreError> {
        let core = &account.core;
        let row: AccountRow = sqlx::query_as(
            "INSERT INTO accounts \
                (kind, first_name, last_name, email, phone, national_id, \
                 is_active, is_admin, password, staff_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(account.kind.tag().as_str())
        .bind(&core.first_name)
        .bind(&core.last_name)
        .bind(core.email.as_str())
        .bind(core.phone.as_str())
        .bind(core.national_id.as_str())
        .bind(core.is_active)
        .bind(core.is_admin)
        .bind(password)
        .bind(account.kind.staff_id().map(|s| s.as_str()))
        .fetch_one(self.pool)
        .await?;

        Ok(Account::try_from(row)?)
    }

    /// Fetch an account of any kind.
    pub async fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(StoreError::NotFound {
            entity: "account",
            id: id.0,
        })?;
        Ok(Account::try_from(row)?)
    }

    /// Fetch an account, treating one of another kind as missing.
    pub async fn get_kind(&self, id: AccountId, kind: KindTag) -> Result<Account, StoreError> {
        let account = self.get(id).await?;
        if account.kind.tag() != kind {
            return Err(StoreError::NotFound {
                entity: kind.as_str(),
                id: id.0,
            });
        }
        Ok(account)
    }

    /// Look up an account by its login email.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Account::try_from).transpose()?)
    }

    /// List accounts matching a filter.
    pub async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM accounts WHERE 1 = 1");

        if let Some(kind) = filter.kind {
            query.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(is_admin) = filter.is_admin {
            query.push(" AND is_admin = ").push_bind(is_admin);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query
                .push(" AND (email LIKE ")
                .push_bind(pattern.clone())
                .push(" OR national_id LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(if filter.order_by_email {
            " ORDER BY email"
        } else {
            " ORDER BY id"
        });

        let rows = query.build_query_as::<AccountRow>().fetch_all(self.pool).await?;
        rows.into_iter()
            .map(|row| Account::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Write every mutable field of an account back.
    ///
    /// The kind is fixed at creation and is not changed here.
    pub async fn save(&self, account: &Account) -> Result<(), StoreError> {
        let core = &account.core;
        let result = sqlx::query(
            "UPDATE accounts SET \
                first_name = ?, last_name = ?, email = ?, phone = ?, national_id = ?, \
                is_active = ?, is_admin = ?, password = ?, last_login = ?, staff_id = ? \
             WHERE id = ? AND kind = ?",
        )
        .bind(&core.first_name)
        .bind(&core.last_name)
        .bind(core.email.as_str())
        .bind(core.phone.as_str())
        .bind(core.national_id.as_str())
        .bind(core.is_active)
        .bind(core.is_admin)
        .bind(&account.password)
        .bind(account.last_login)
        .bind(account.kind.staff_id().map(|s| s.as_str()))
        .bind(account.id)
        .bind(account.kind.tag().as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "account",
                id: account.id.0,
            });
        }
        Ok(())
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete an account of the given kind.
    ///
    /// Fails with [`StoreError::Protected`] while buses or bookings still
    /// reference it.
    pub async fn delete(&self, id: AccountId, kind: KindTag) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ? AND kind = ?")
            .bind(id)
            .bind(kind.as_str())
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::on_delete(e, kind.as_str(), id.0))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: kind.as_str(),
                id: id.0,
            });
        }
        Ok(())
    }

    /// Count accounts, optionally of one kind.
    pub async fn count(&self, kind: Option<KindTag>) -> Result<i64, StoreError> {
        let count: i64 = match kind {
            Some(kind) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE kind = ?")
                    .bind(kind.as_str())
                    .fetch_one(self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
                    .fetch_one(self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}

/// Check that `id` names an account of `kind`, inside a transaction.
///
/// `field` names the referencing column in the error message.
pub(crate) async fn expect_kind(
    conn: &mut SqliteConnection,
    id: AccountId,
    kind: KindTag,
    field: &str,
) -> Result<(), StoreError> {
    let stored: Option<String> = sqlx::query_scalar("SELECT kind FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match stored {
        Some(stored) if stored == kind.as_str() => Ok(()),
        Some(_) => Err(StoreError::InvalidReference(format!(
            "{field}: account {id} is not a {kind}"
        ))),
        None => Err(StoreError::InvalidReference(format!(
            "{field}: {kind} {id} does not exist"
        ))),
    }
}
