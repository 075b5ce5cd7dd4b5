//! Capability checks.
//!
//! Every permission question ("may this account do X?") goes through a
//! [`Policy`]. Which policy is active is a deployment choice made in
//! [`crate::config::ServerConfig`].

use std::fmt;
use std::sync::Arc;

use crate::domain::Account;

/// Something an account may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability<'a> {
    /// A named permission such as `bookerserver.change_bus`.
    Perm(&'a str),
    /// Access to every record of an application, such as `bookerserver`.
    ModulePerms(&'a str),
}

/// Decides whether an account holds a capability.
pub trait Policy: Send + Sync + fmt::Debug {
    /// Returns true when `account` may exercise `capability`.
    fn permits(&self, account: &Account, capability: Capability<'_>) -> bool;
}

/// Grants every capability to every account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Policy for AllowAll {
    fn permits(&self, _account: &Account, _capability: Capability<'_>) -> bool {
        true
    }
}

/// Grants every capability to active administrators and nothing to anyone
/// else.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

impl Policy for AdminOnly {
    fn permits(&self, account: &Account, _capability: Capability<'_>) -> bool {
        account.core.is_active && account.core.is_admin
    }
}

/// Configurable choice of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    AllowAll,
    AdminOnly,
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy {0:?}: expected \"allow-all\" or \"admin-only\"")]
pub struct InvalidPolicy(String);

impl PolicyKind {
    /// Parse a policy name from configuration.
    pub fn parse(s: &str) -> Result<Self, InvalidPolicy> {
        match s.trim() {
            "allow-all" => Ok(PolicyKind::AllowAll),
            "admin-only" => Ok(PolicyKind::AdminOnly),
            other => Err(InvalidPolicy(other.to_string())),
        }
    }

    /// Build the policy object.
    pub fn build(self) -> Arc<dyn Policy> {
        match self {
            PolicyKind::AllowAll => Arc::new(AllowAll),
            PolicyKind::AdminOnly => Arc::new(AdminOnly),
        }
    }
}
