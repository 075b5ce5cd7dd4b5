//! Identity and contact field types.
//!
//! Each type can only be built through `parse`, so an `Email` or
//! `NationalId` held anywhere in the crate is known to be valid.

use std::fmt;

use serde::Serialize;

use super::error::DomainError;

/// A normalized email address, the login identifier of an account.
///
/// Normalization lower-cases the domain part and leaves the local part
/// untouched, since mailbox names may be case sensitive.
///
/// # Examples
///
/// ```
/// use booker_server::domain::Email;
///
/// let email = Email::parse("Jane.Doe@Example.COM").unwrap();
/// assert_eq!(email.as_str(), "Jane.Doe@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-sign").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum stored length.
    pub const MAX_LEN: usize = 255;

    /// Parse and normalize an email address.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::MissingEmail);
        }

        let Some((local, domain)) = s.rsplit_once('@') else {
            return Err(DomainError::InvalidEmail(s.to_string()));
        };
        if local.is_empty() || domain.is_empty() || s.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidEmail(s.to_string()));
        }

        Ok(Email(format!("{local}@{}", domain.to_lowercase())))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contact phone number: non-empty, at most 13 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum stored length (fits `+254712345678`).
    pub const MAX_LEN: usize = 13;

    /// Parse a phone number.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() || s.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidPhone);
        }
        Ok(Phone(s.to_string()))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A national identity card number: non-empty, at most 8 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Maximum stored length.
    pub const MAX_LEN: usize = 8;

    /// Parse a national identifier.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() || s.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidNationalId);
        }
        Ok(NationalId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A driver's staff identifier: non-empty, at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StaffId(String);

impl StaffId {
    /// Maximum stored length.
    pub const MAX_LEN: usize = 20;

    /// Parse a staff identifier.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() || s.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidStaffId);
        }
        Ok(StaffId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalizes_domain_only() {
        let email = Email::parse("  MixedCase@Mail.Example.ORG ").unwrap();
        assert_eq!(email.as_str(), "MixedCase@mail.example.org");
    }

    #[test]
    fn email_missing() {
        assert_eq!(Email::parse(""), Err(DomainError::MissingEmail));
        assert_eq!(Email::parse("   "), Err(DomainError::MissingEmail));
    }

    #[test]
    fn email_malformed() {
        assert!(matches!(
            Email::parse("user@"),
            Err(DomainError::InvalidEmail(_))
        ));
        assert!(matches!(
            Email::parse("@example.com"),
            Err(DomainError::InvalidEmail(_))
        ));
        assert!(matches!(
            Email::parse("plain"),
            Err(DomainError::InvalidEmail(_))
        ));
    }

    #[test]
    fn national_id_bounds() {
        assert!(NationalId::parse("12345678").is_ok());
        assert_eq!(
            NationalId::parse("123456789"),
            Err(DomainError::InvalidNationalId)
        );
        assert_eq!(NationalId::parse(""), Err(DomainError::InvalidNationalId));
    }

    #[test]
    fn phone_bounds() {
        assert!(Phone::parse("+254712345678").is_ok());
        assert_eq!(Phone::parse("+2547123456789"), Err(DomainError::InvalidPhone));
        assert_eq!(Phone::parse(""), Err(DomainError::InvalidPhone));
    }

    #[test]
    fn staff_id_bounds() {
        assert_eq!(StaffId::parse("D100").unwrap().as_str(), "D100");
        assert_eq!(StaffId::parse(""), Err(DomainError::InvalidStaffId));
        assert_eq!(
            StaffId::parse(&"x".repeat(21)),
            Err(DomainError::InvalidStaffId)
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any identifier longer than 8 characters is rejected
        #[test]
        fn long_national_id_rejected(s in "[0-9A-Z]{9,20}") {
            prop_assert_eq!(NationalId::parse(&s), Err(DomainError::InvalidNationalId));
        }

        /// Identifiers of 1 to 8 characters are kept verbatim
        #[test]
        fn short_national_id_kept(s in "[0-9A-Z]{1,8}") {
            let id = NationalId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Normalizing twice gives the same address
        #[test]
        fn email_normalization_idempotent(local in "[a-zA-Z0-9._]{1,20}", domain in "[a-zA-Z]{1,10}\\.[a-zA-Z]{2,4}") {
            let once = Email::parse(&format!("{local}@{domain}")).unwrap();
            let twice = Email::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
