//! Application state for the web layer.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::accounts::AccountManager;
use crate::auth::Policy;
use crate::store::Store;

use super::links::Links;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub store: Store,

    /// Account factory
    pub accounts: Arc<AccountManager>,

    /// Permission policy consulted by the admin console
    pub policy: Arc<dyn Policy>,

    /// Fixed hyperlink base; `None` derives it per request
    pub public_url: Option<Arc<str>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: Store, policy: Arc<dyn Policy>, public_url: Option<String>) -> Self {
        Self {
            accounts: Arc::new(AccountManager::new(store.clone())),
            store,
            policy,
            public_url: public_url.map(Arc::from),
        }
    }

    /// Link builder for one request.
    pub fn links(&self, headers: &HeaderMap) -> Links {
        match &self.public_url {
            Some(base) => Links::new(base.as_ref()),
            None => Links::from_headers(headers),
        }
    }
}
