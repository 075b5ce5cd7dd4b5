//! Account creation and login.
//!
//! [`AccountManager`] is the only place new accounts are made: it validates
//! the raw fields, normalizes the email, hashes the password and stores the
//! record in one step.

use chrono::Utc;
use tracing::{debug, info};

use crate::auth::{PasswordError, PasswordHasher};
use crate::domain::{Account, AccountCore, AccountKind, DomainError, Email, NewAccount, StaffId};
use crate::store::{Store, StoreError};

/// Errors from creating or authenticating an account.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// A field failed validation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The password could not be hashed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The database rejected the write
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw identity fields for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
}

impl NewUser {
    /// Validate into a core record.
    pub fn validate(&self) -> Result<AccountCore, DomainError> {
        AccountCore::new(
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.national_id,
        )
    }
}

/// Factory for accounts.
#[derive(Debug, Clone)]
pub struct AccountManager {
    store: Store,
    hasher: PasswordHasher,
}

impl AccountManager {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    /// Create a plain account.
    ///
    /// Fails before touching the database if the email is empty or
    /// malformed, the national id is empty or longer than 8 characters, or
    /// the phone number is empty. `None` stores an unusable password.
    pub async fn create_user(
        &self,
        user: &NewUser,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        self.create(user, AccountKind::Basic, password).await
    }

    /// Create an administrator.
    pub async fn create_superuser(
        &self,
        user: &NewUser,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        let mut core = user.validate()?;
        core.is_admin = true;
        let kind = AccountKind::Basic;
        let account = self.create_account(NewAccount { core, kind }, password).await?;
        info!(id = %account.id, email = %account.core.email, "created superuser");
        Ok(account)
    }

    /// Create a non-administrator plain account.
    pub async fn create_staff(
        &self,
        user: &NewUser,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        let mut core = user.validate()?;
        core.is_admin = false;
        let kind = AccountKind::Basic;
        self.create_account(NewAccount { core, kind }, password).await
    }

    /// Create a passenger.
    pub async fn create_passenger(
        &self,
        user: &NewUser,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        self.create(user, AccountKind::Passenger, password).await
    }

    /// Create a driver with the given staff id.
    pub async fn create_driver(
        &self,
        user: &NewUser,
        staff_id: &str,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        // Core fields are validated first so their errors take precedence.
        let core = user.validate()?;
        let staff_id = StaffId::parse(staff_id)?;
        let kind = AccountKind::Driver { staff_id };
        self.create_account(NewAccount { core, kind }, password).await
    }

    /// Check an email and password.
    ///
    /// Returns the account if it exists, is active and the password
    /// verifies; its `last_login` is stamped on success. Unknown emails and
    /// wrong passwords both give `None`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let Some(mut account) = self.store.accounts().find_by_email(&email).await? else {
            debug!(%email, "login for unknown account");
            return Ok(None);
        };
        if !account.core.is_active || !self.hasher.verify(password, &account.password) {
            debug!(%email, "login rejected");
            return Ok(None);
        }

        let now = Utc::now();
        self.store.accounts().touch_last_login(account.id, now).await?;
        account.last_login = Some(now);
        Ok(Some(account))
    }

    /// Replace an account's password and save it. `None` makes the
    /// password unusable.
    pub async fn set_password(
        &self,
        account: &mut Account,
        password: Option<&str>,
    ) -> Result<(), AccountError> {
        account.password = self.hasher.hash(password)?;
        self.store.accounts().save(account).await?;
        Ok(())
    }

    async fn create(
        &self,
        user: &NewUser,
        kind: AccountKind,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        let core = user.validate()?;
        self.create_account(NewAccount { core, kind }, password).await
    }

    /// Store an already validated account in a single insert.
    pub async fn create_account(
        &self,
        account: NewAccount,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        let encoded = self.hasher.hash(password)?;
        let account = self.store.accounts().insert(&account, &encoded).await?;
        debug!(id = %account.id, kind = %account.kind.tag(), "account created");
        Ok(account)
    }
}
