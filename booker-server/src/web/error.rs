//! Application error type for JSON endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::accounts::AccountError;
use crate::domain::DomainError;
use crate::store::StoreError;

use super::dto::ErrorResponse;
use super::links::LinkError;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    /// A required body field was absent.
    pub fn missing(field: &str) -> Self {
        Self::bad_request(format!("{field}: This field is required."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

impl From<LinkError> for AppError {
    fn from(e: LinkError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::NotFound { .. } => AppError::NotFound { message },
            StoreError::Duplicate(_) | StoreError::InvalidReference(_) => {
                AppError::BadRequest { message }
            }
            StoreError::Protected { .. } | StoreError::CapacityExhausted(_) => {
                AppError::Conflict { message }
            }
            StoreError::Domain(_) | StoreError::Database(_) | StoreError::Migrate(_) => {
                AppError::Internal { message }
            }
        }
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Domain(e) => e.into(),
            AccountError::Store(e) => e.into(),
            AccountError::Password(e) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "request failed");
        } else {
            warn!(%status, message = self.message(), "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
