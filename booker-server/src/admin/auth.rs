//! Admin login via HTTP Basic authentication.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::auth::BasicCredentials;
use crate::domain::Account;
use crate::web::AppState;

use super::error::AdminError;

/// Application label checked with `has_module_perms`.
pub const APP_LABEL: &str = "bookerserver";

/// A staff account that passed the login and permission checks.
///
/// Extracting this authenticates the request: the email and password come
/// from the `Authorization` header, the account must be active and staff,
/// and the configured policy must grant it the console. Each successful
/// extraction stamps `last_login`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(BasicCredentials::parse)
            .ok_or(AdminError::Unauthorized)?;

        let account = state
            .accounts
            .authenticate(&credentials.username, &credentials.password)
            .await?
            .ok_or(AdminError::Unauthorized)?;

        if !account.is_staff() || !account.has_module_perms(state.policy.as_ref(), APP_LABEL) {
            warn!(email = %account.core.email, "admin access denied");
            return Err(AdminError::Forbidden);
        }

        debug!(email = %account.core.email, "admin login");
        Ok(StaffUser(account))
    }
}
