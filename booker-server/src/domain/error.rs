//! Domain error types.
//!
//! These errors represent validation failures on record fields. They are
//! raised while building domain values and are distinct from storage and
//! HTTP errors.

/// Domain-level errors for field validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Email is empty
    #[error("Users must have an email address")]
    MissingEmail,

    /// Email is not of the form `local@domain` or is too long
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// National identifier is empty or longer than 8 characters
    #[error("Invalid ID number")]
    InvalidNationalId,

    /// Phone is empty or longer than 13 characters
    #[error("Invalid phone number")]
    InvalidPhone,

    /// Driver staff identifier is empty or longer than 20 characters
    #[error("invalid staff id: must be 1 to 20 characters")]
    InvalidStaffId,

    /// Required text field is empty
    #[error("{0} may not be blank")]
    Blank(&'static str),

    /// Text field exceeds its maximum length
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Seat count outside 0..=99
    #[error("{field} must be between 0 and 99, got {value}")]
    SeatsOutOfRange { field: &'static str, value: i64 },

    /// Floating-point field is NaN or infinite
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// City is not one of the served towns
    #[error("\"{0}\" is not a valid choice")]
    UnknownCity(String),

    /// Booking status is not one of the known codes
    #[error("\"{0}\" is not a valid booking status")]
    UnknownStatus(String),

    /// Account kind discriminant is not recognised
    #[error("unknown account kind: {0}")]
    UnknownKind(String),
}

/// Check a text field's length, allowing empty values.
pub(crate) fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::TooLong { field, max });
    }
    Ok(value.to_string())
}

/// Check a text field is non-empty and within its maximum length.
pub(crate) fn required(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Blank(field));
    }
    bounded(field, value, max)
}

/// Reject NaN and infinities.
pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NotFinite(field))
    }
}
