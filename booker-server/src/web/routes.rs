//! HTTP router.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::get,
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::admin;
use crate::domain::KindTag;

use super::dto::ApiRoot;
use super::error::AppError;
use super::resources;
use super::state::AppState;

/// Create the application router: the JSON API at the root and the admin
/// console under `/admin/`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route("/health", get(health))
        .merge(resources::accounts::routes(KindTag::Passenger))
        .merge(resources::accounts::routes(KindTag::Driver))
        .merge(resources::buses::routes())
        .merge(resources::routes::routes())
        .merge(resources::bookings::routes())
        .merge(admin::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Links to every collection.
async fn api_root(State(state): State<AppState>, headers: HeaderMap) -> Json<ApiRoot> {
    Json(ApiRoot::new(&state.links(&headers)))
}

/// Parse a JSON request body. Malformed bodies are logged and answered
/// with 400.
pub(super) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(body = %String::from_utf8_lossy(body), "JSON parse error: {e}");
        AppError::bad_request(format!("Invalid JSON: {e}"))
    })
}
