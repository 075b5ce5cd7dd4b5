//! Booking collection, plus fare computation.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::domain::BookingId;
use crate::web::dto::{BookingBody, BookingWrite, TotalCostResponse};
use crate::web::error::AppError;
use crate::web::routes::parse_json;
use crate::web::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/booking/", get(list).post(create))
        .route(
            "/booking/:id/",
            get(retrieve).put(replace).patch(modify).delete(destroy),
        )
        .route("/booking/:id/total_cost/", post(total_cost))
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingBody>>, AppError> {
    let bookings = state.store.bookings().list().await?;
    let links = state.links(&headers);
    Ok(Json(
        bookings
            .iter()
            .map(|b| BookingBody::new(&links, b))
            .collect(),
    ))
}

/// Record a booking. Seat availability is not checked.
async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let write: BookingWrite = parse_json(&body)?;
    let booking = state
        .store
        .bookings()
        .insert(&write.resolve(None, false)?)
        .await?;
    info!(id = %booking.id, bus = %booking.bus, "booking created");

    let links = state.links(&headers);
    Ok((StatusCode::CREATED, Json(BookingBody::new(&links, &booking))))
}

async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingBody>, AppError> {
    let booking = state.store.bookings().get(BookingId(id)).await?;
    Ok(Json(BookingBody::new(&state.links(&headers), &booking)))
}

async fn replace(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<BookingBody>, AppError> {
    update(state, headers, id, body, false).await
}

async fn modify(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<BookingBody>, AppError> {
    update(state, headers, id, body, true).await
}

/// Status changes are not validated; any status may follow any other.
async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
    partial: bool,
) -> Result<Json<BookingBody>, AppError> {
    let write: BookingWrite = parse_json(&body)?;
    let current = state.store.bookings().get(BookingId(id)).await?;
    let booking = write.resolve(Some(&current), partial)?.with_id(current.id);
    state.store.bookings().save(&booking).await?;
    Ok(Json(BookingBody::new(&state.links(&headers), &booking)))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.bookings().delete(BookingId(id)).await?;
    info!(id, "booking deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Recompute the fare from the bus rate and route cost, and persist it.
async fn total_cost(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TotalCostResponse>, AppError> {
    let store = &state.store;
    let mut booking = store.bookings().get(BookingId(id)).await?;

    let (buses, routes) = (store.buses(), store.routes());
    let (bus, route) =
        futures::try_join!(buses.get(booking.bus), routes.get(booking.route))?;
    let total_cost = booking.total_cost(bus.rates, route.cost);
    store.bookings().save(&booking).await?;

    Ok(Json(TotalCostResponse { total_cost }))
}
