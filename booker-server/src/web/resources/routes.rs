//! Route collection.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use tracing::info;

use crate::domain::RouteId;
use crate::web::dto::{RouteBody, RouteWrite};
use crate::web::error::AppError;
use crate::web::routes::parse_json;
use crate::web::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/routes/", get(list).post(create)).route(
        "/routes/:id/",
        get(retrieve).put(replace).patch(modify).delete(destroy),
    )
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RouteBody>>, AppError> {
    let routes = state.store.routes().list().await?;
    let links = state.links(&headers);
    Ok(Json(routes.iter().map(|r| RouteBody::new(&links, r)).collect()))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let write: RouteWrite = parse_json(&body)?;
    let route = state
        .store
        .routes()
        .insert(&write.resolve(None, false)?)
        .await?;
    info!(id = %route.id, %route, "route created");

    let links = state.links(&headers);
    Ok((StatusCode::CREATED, Json(RouteBody::new(&links, &route))))
}

async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<RouteBody>, AppError> {
    let route = state.store.routes().get(RouteId(id)).await?;
    Ok(Json(RouteBody::new(&state.links(&headers), &route)))
}

async fn replace(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<RouteBody>, AppError> {
    update(state, headers, id, body, false).await
}

async fn modify(
    state: State<AppState>,
    headers: HeaderMap,
    id: Path<i64>,
    body: Bytes,
) -> Result<Json<RouteBody>, AppError> {
    update(state, headers, id, body, true).await
}

async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
    partial: bool,
) -> Result<Json<RouteBody>, AppError> {
    let write: RouteWrite = parse_json(&body)?;
    let current = state.store.routes().get(RouteId(id)).await?;
    let route = write.resolve(Some(&current), partial)?.with_id(current.id);
    state.store.routes().save(&route).await?;
    Ok(Json(RouteBody::new(&state.links(&headers), &route)))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.routes().delete(RouteId(id)).await?;
    info!(id, "route deleted");
    Ok(StatusCode::NO_CONTENT)
}
