//! Account types.
//!
//! Every account shares an [`AccountCore`] of identity and contact fields.
//! What kind of account it is (plain, passenger or driver) is carried by the
//! [`AccountKind`] tag rather than by separate record types, and is stored
//! in an explicit `kind` column.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::auth::{Capability, Policy};

use super::contact::{Email, NationalId, Phone, StaffId};
use super::error::{DomainError, bounded};
use super::ids::AccountId;

/// Maximum length of first and last names.
pub const NAME_MAX_LEN: usize = 255;

/// Identity and contact fields shared by every account kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountCore {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub national_id: NationalId,
    pub is_active: bool,
    pub is_admin: bool,
}

impl AccountCore {
    /// Validate raw fields into a core record.
    ///
    /// Checks run in a fixed order: email, national id, phone, then names.
    /// The account starts active and without administrator rights.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        national_id: &str,
    ) -> Result<Self, DomainError> {
        let email = Email::parse(email)?;
        let national_id = NationalId::parse(national_id)?;
        let phone = Phone::parse(phone)?;

        Ok(Self {
            first_name: bounded("first_name", first_name, NAME_MAX_LEN)?,
            last_name: bounded("last_name", last_name, NAME_MAX_LEN)?,
            email,
            phone,
            national_id,
            is_active: true,
            is_admin: false,
        })
    }

    /// `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Discriminant stored in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Basic,
    Passenger,
    Driver,
}

impl KindTag {
    /// Column value.
    pub fn as_str(self) -> &'static str {
        match self {
            KindTag::Basic => "basic",
            KindTag::Passenger => "passenger",
            KindTag::Driver => "driver",
        }
    }

    /// Parse a column value.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "basic" => Ok(KindTag::Basic),
            "passenger" => Ok(KindTag::Passenger),
            "driver" => Ok(KindTag::Driver),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of account this is, with kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    /// Plain account, as created by the superuser and staff factories.
    Basic,
    /// A traveller who makes bookings.
    Passenger,
    /// A bus driver. Drivers are always staff.
    Driver { staff_id: StaffId },
}

impl AccountKind {
    /// The stored discriminant.
    pub fn tag(&self) -> KindTag {
        match self {
            AccountKind::Basic => KindTag::Basic,
            AccountKind::Passenger => KindTag::Passenger,
            AccountKind::Driver { .. } => KindTag::Driver,
        }
    }

    /// The driver's staff id, if this is a driver.
    pub fn staff_id(&self) -> Option<&StaffId> {
        match self {
            AccountKind::Driver { staff_id } => Some(staff_id),
            _ => None,
        }
    }
}

/// A validated account that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub core: AccountCore,
    pub kind: AccountKind,
}

/// A stored account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub core: AccountCore,
    pub kind: AccountKind,
    /// Encoded password hash, or an unusable marker.
    pub password: String,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        self.core.full_name()
    }

    /// Drivers are always staff; everyone else is staff when they are an
    /// administrator.
    pub fn is_staff(&self) -> bool {
        matches!(self.kind, AccountKind::Driver { .. }) || self.core.is_admin
    }

    /// Whether the account may perform a named action.
    pub fn has_perm(&self, policy: &dyn Policy, perm: &str) -> bool {
        policy.permits(self, Capability::Perm(perm))
    }

    /// Whether the account may view the given application's records.
    pub fn has_module_perms(&self, policy: &dyn Policy, app_label: &str) -> bool {
        policy.permits(self, Capability::ModulePerms(app_label))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AccountKind::Basic => write!(f, "{}", self.core.email),
            AccountKind::Passenger | AccountKind::Driver { .. } => write!(
                f,
                "Email: {} Phone: {} ID: {}",
                self.core.email, self.core.phone, self.core.national_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AdminOnly, AllowAll};

    fn core() -> AccountCore {
        AccountCore::new("Jane", "Wanjiru", "jane@example.com", "0712345678", "12345678").unwrap()
    }

    fn account(kind: AccountKind) -> Account {
        Account {
            id: AccountId(1),
            core: core(),
            kind,
            password: "!".into(),
            last_login: None,
        }
    }

    #[test]
    fn core_defaults() {
        let core = core();
        assert!(core.is_active);
        assert!(!core.is_admin);
        assert_eq!(core.full_name(), "Jane Wanjiru");
    }

    #[test]
    fn core_validation_order() {
        // Email is checked before the national id.
        assert_eq!(
            AccountCore::new("a", "b", "", "0712", "123456789"),
            Err(DomainError::MissingEmail)
        );
        assert_eq!(
            AccountCore::new("a", "b", "a@b.c", "", "123456789"),
            Err(DomainError::InvalidNationalId)
        );
        assert_eq!(
            AccountCore::new("a", "b", "a@b.c", "", "1234"),
            Err(DomainError::InvalidPhone)
        );
    }

    #[test]
    fn display_by_kind() {
        assert_eq!(account(AccountKind::Basic).to_string(), "jane@example.com");
        assert_eq!(
            account(AccountKind::Passenger).to_string(),
            "Email: jane@example.com Phone: 0712345678 ID: 12345678"
        );
    }

    #[test]
    fn drivers_are_always_staff() {
        let driver = account(AccountKind::Driver {
            staff_id: StaffId::parse("D100").unwrap(),
        });
        assert!(driver.is_staff());
        assert!(!account(AccountKind::Passenger).is_staff());

        let mut admin = account(AccountKind::Basic);
        admin.core.is_admin = true;
        assert!(admin.is_staff());
    }

    #[test]
    fn permissions_follow_policy() {
        let passenger = account(AccountKind::Passenger);
        assert!(passenger.has_perm(&AllowAll, "bookerserver.delete_bus"));
        assert!(passenger.has_module_perms(&AllowAll, "bookerserver"));
        assert!(!passenger.has_perm(&AdminOnly, "bookerserver.delete_bus"));
    }

    #[test]
    fn kind_tag_roundtrip() {
        for tag in [KindTag::Basic, KindTag::Passenger, KindTag::Driver] {
            assert_eq!(KindTag::parse(tag.as_str()), Ok(tag));
        }
        assert!(KindTag::parse("admin").is_err());
    }
}
