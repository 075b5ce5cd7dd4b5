//! Passenger and driver collections.
//!
//! Both are views of the one accounts table filtered by kind, so the same
//! handlers serve both with the kind fixed at routing time.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use tracing::info;

use crate::domain::{AccountId, AccountKind, KindTag, NewAccount, StaffId};
use crate::store::AccountFilter;
use crate::web::dto::{AccountBody, AccountWrite};
use crate::web::error::AppError;
use crate::web::links::Resource;
use crate::web::routes::parse_json;
use crate::web::state::AppState;

/// Routes for one account kind.
pub fn routes(kind: KindTag) -> Router<AppState> {
    let resource = resource(kind);
    Router::new()
        .route(
            &format!("/{resource}/"),
            get(move |state: State<AppState>, headers: HeaderMap| list(kind, state, headers)).post(
                move |state: State<AppState>, headers: HeaderMap, body: Bytes| {
                    create(kind, state, headers, body)
                },
            ),
        )
        .route(
            &format!("/{resource}/:id/"),
            get(
                move |state: State<AppState>, headers: HeaderMap, id: Path<i64>| {
                    retrieve(kind, state, headers, id)
                },
            )
            .put(
                move |state: State<AppState>, headers: HeaderMap, id: Path<i64>, body: Bytes| {
                    update(kind, state, headers, id, body, false)
                },
            )
            .patch(
                move |state: State<AppState>, headers: HeaderMap, id: Path<i64>, body: Bytes| {
                    update(kind, state, headers, id, body, true)
                },
            )
            .delete(move |state: State<AppState>, id: Path<i64>| destroy(kind, state, id)),
        )
}

fn resource(kind: KindTag) -> Resource {
    match kind {
        KindTag::Driver => Resource::Driver,
        KindTag::Basic | KindTag::Passenger => Resource::Passenger,
    }
}

async fn list(
    kind: KindTag,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AccountBody>>, AppError> {
    let mut filter = AccountFilter::kind(kind);
    if kind == KindTag::Passenger {
        filter = filter.ordered_by_email();
    }
    let accounts = state.store.accounts().list(&filter).await?;

    let links = state.links(&headers);
    Ok(Json(
        accounts
            .iter()
            .map(|a| AccountBody::new(&links, resource(kind), a))
            .collect(),
    ))
}

async fn create(
    kind: KindTag,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let write: AccountWrite = parse_json(&body)?;
    let fields = write.resolve(kind, None, false)?;

    let mut core = fields.user.validate()?;
    core.is_active = fields.is_active;
    core.is_admin = fields.is_admin;
    let account_kind = match (kind, fields.staff_id.as_deref()) {
        (KindTag::Driver, Some(staff_id)) => AccountKind::Driver {
            staff_id: StaffId::parse(staff_id)?,
        },
        (KindTag::Driver, None) => return Err(AppError::missing("staff_id")),
        _ => AccountKind::Passenger,
    };
    let account = state
        .accounts
        .create_account(
            NewAccount {
                core,
                kind: account_kind,
            },
            fields.password.as_deref(),
        )
        .await?;
    info!(id = %account.id, %kind, "account created");

    let links = state.links(&headers);
    Ok((
        StatusCode::CREATED,
        Json(AccountBody::new(&links, resource(kind), &account)),
    ))
}

async fn retrieve(
    kind: KindTag,
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<AccountBody>, AppError> {
    let account = state.store.accounts().get_kind(AccountId(id), kind).await?;
    let links = state.links(&headers);
    Ok(Json(AccountBody::new(&links, resource(kind), &account)))
}

async fn update(
    kind: KindTag,
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
    partial: bool,
) -> Result<Json<AccountBody>, AppError> {
    let write: AccountWrite = parse_json(&body)?;
    let mut account = state.store.accounts().get_kind(AccountId(id), kind).await?;
    let fields = write.resolve(kind, Some(&account), partial)?;

    let mut core = fields.user.validate()?;
    core.is_active = fields.is_active;
    core.is_admin = fields.is_admin;
    account.core = core;
    if let Some(staff_id) = &fields.staff_id {
        account.kind = AccountKind::Driver {
            staff_id: StaffId::parse(staff_id)?,
        };
    }

    match fields.password.as_deref() {
        Some(password) => {
            state
                .accounts
                .set_password(&mut account, Some(password))
                .await?
        }
        None => state.store.accounts().save(&account).await?,
    }

    let links = state.links(&headers);
    Ok(Json(AccountBody::new(&links, resource(kind), &account)))
}

async fn destroy(
    kind: KindTag,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.accounts().delete(AccountId(id), kind).await?;
    info!(id, %kind, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
