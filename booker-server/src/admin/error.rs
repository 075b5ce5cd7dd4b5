//! Admin console errors, rendered as HTML pages.

use askama::Template;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, warn};

use crate::accounts::AccountError;
use crate::store::StoreError;

use super::templates::ErrorTemplate;

/// Realm sent with the Basic authentication challenge.
const REALM: &str = "Basic realm=\"Booker administration\"";

/// Errors from admin pages.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// No usable credentials
    #[error("Please enter the correct email address and password for a staff account.")]
    Unauthorized,

    /// Logged in but not allowed into the console
    #[error("You don't have permission to view or edit anything.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    /// The record is still referenced
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::Forbidden => StatusCode::FORBIDDEN,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Conflict(_) => StatusCode::CONFLICT,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AdminError::Unauthorized => "Log in",
            AdminError::Forbidden => "Permission denied",
            AdminError::NotFound(_) => "Not found",
            AdminError::Conflict(_) => "Cannot delete",
            AdminError::Internal(_) => "Server error",
        }
    }
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AdminError::NotFound(e.to_string()),
            StoreError::Protected { .. } => AdminError::Conflict(e.to_string()),
            other => AdminError::Internal(other.to_string()),
        }
    }
}

impl From<AccountError> for AdminError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Store(e) => e.into(),
            other => AdminError::Internal(other.to_string()),
        }
    }
}

impl From<askama::Error> for AdminError {
    fn from(e: askama::Error) -> Self {
        AdminError::Internal(format!("Template error: {e}"))
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = %self, "admin request failed");
        } else {
            warn!(%status, message = %self, "admin request rejected");
        }

        let page = ErrorTemplate {
            title: self.title().to_string(),
            message: self.to_string(),
        };
        let html = page
            .render()
            .unwrap_or_else(|e| format!("Template error: {e}"));

        let mut response = (status, Html(html)).into_response();
        if matches!(self, AdminError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static(REALM));
        }
        response
    }
}
