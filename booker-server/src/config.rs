//! Server configuration from the environment.

use std::net::SocketAddr;

use crate::auth::{InvalidPolicy, PolicyKind};
use crate::store::StoreConfig;

/// Database URL variable.
pub const DATABASE_URL_VAR: &str = "BOOKER_DATABASE_URL";
/// Listen address variable.
pub const BIND_ADDR_VAR: &str = "BOOKER_BIND_ADDR";
/// Public base URL variable.
pub const PUBLIC_URL_VAR: &str = "BOOKER_PUBLIC_URL";
/// Permission policy variable.
pub const POLICY_VAR: &str = "BOOKER_POLICY";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{BIND_ADDR_VAR}: invalid socket address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("{PUBLIC_URL_VAR}: expected an absolute http(s) URL, got {0:?}")]
    PublicUrl(String),

    #[error("{POLICY_VAR}: {0}")]
    Policy(#[from] InvalidPolicy),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Database settings.
    pub store: StoreConfig,

    /// Base for hyperlinks, without a trailing slash. When unset, links
    /// are built from the request's `Host` header.
    pub public_url: Option<String>,

    /// Which permission policy accounts are checked against.
    pub policy: PolicyKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            store: StoreConfig::default(),
            public_url: None,
            policy: PolicyKind::default(),
        }
    }
}

impl ServerConfig {
    /// Read the `BOOKER_*` variables, falling back to defaults for any that
    /// are unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.store = StoreConfig::new(url);
        }
        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr.parse().map_err(|source| ConfigError::BindAddr {
                value: addr.clone(),
                source,
            })?;
        }
        if let Some(url) = lookup(PUBLIC_URL_VAR) {
            config.public_url = Some(normalize_public_url(&url)?);
        }
        if let Some(policy) = lookup(POLICY_VAR) {
            config.policy = PolicyKind::parse(&policy)?;
        }

        Ok(config)
    }

    /// Set the hyperlink base.
    pub fn with_public_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.public_url = Some(normalize_public_url(url)?);
        Ok(self)
    }
}

fn normalize_public_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::PublicUrl(url.to_string())),
    }
}
