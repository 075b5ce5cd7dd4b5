//! Bus collection, plus the capacity actions.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::domain::BusId;
use crate::web::dto::{BusBody, BusWrite, FullCapacityResponse};
use crate::web::error::AppError;
use crate::web::routes::parse_json;
use crate::web::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bus/", get(list).post(create))
        .route(
            "/bus/:id/",
            get(retrieve).put(replace).patch(modify).delete(destroy),
        )
        .route("/bus/:id/full_capacity/", post(full_capacity))
        .route("/bus/:id/reserve/", post(reserve))
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BusBody>>, AppError> {
    let buses = state.store.buses().list().await?;
    let links = state.links(&headers);
    Ok(Json(buses.iter().map(|b| BusBody::new(&links, b)).collect()))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let write: BusWrite = parse_json(&body)?;
    let bus = state
        .store
        .buses()
        .insert(&write.resolve(None, false)?)
        .await?;
    info!(id = %bus.id, name = %bus.bus_name, "bus created");

    let links = state.links(&headers);
    Ok((StatusCode::CREATED, Json(BusBody::new(&links, &bus))))
}

async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BusBody>, AppError> {
    let bus = state.store.buses().get(BusId(id)).await?;
    Ok(Json(BusBody::new(&state.links(&headers), &bus)))
}

async fn replace(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<BusBody>, AppError> {
    update(state, headers, id, body, false).await
}

async fn modify(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<BusBody>, AppError> {
    update(state, headers, id, body, true).await
}

async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
    partial: bool,
) -> Result<Json<BusBody>, AppError> {
    let write: BusWrite = parse_json(&body)?;
    let current = state.store.buses().get(BusId(id)).await?;
    let bus = write.resolve(Some(&current), partial)?.with_id(current.id);
    state.store.buses().save(&bus).await?;
    Ok(Json(BusBody::new(&state.links(&headers), &bus)))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.buses().delete(BusId(id)).await?;
    info!(id, "bus deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Recompute and persist the full flag.
async fn full_capacity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FullCapacityResponse>, AppError> {
    let is_full = state.store.buses().refresh_full(BusId(id)).await?;
    Ok(Json(FullCapacityResponse { is_full }))
}

/// Take one seat, or 409 when none is left.
async fn reserve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BusBody>, AppError> {
    let bus = state.store.buses().reserve_seat(BusId(id)).await?;
    Ok(Json(BusBody::new(&state.links(&headers), &bus)))
}
