//! Credentials and permission checks.
//!
//! Password hashing, HTTP Basic credential parsing and the capability
//! [`Policy`] consulted by accounts and the admin console.

mod basic;
mod password;
mod policy;

pub use basic::BasicCredentials;
pub use password::{
    PasswordError, PasswordHasher, UNUSABLE_PASSWORD_PREFIX, describe as describe_password,
    is_usable as is_usable_password,
};
pub use policy::{AdminOnly, AllowAll, Capability, InvalidPolicy, Policy, PolicyKind};
