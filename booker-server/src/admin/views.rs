//! Admin page handlers.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

use crate::auth::describe_password;
use crate::domain::{
    Account, AccountId, BookingId, BookingStatus, BusId, City, DEFAULT_RATES, KindTag, RouteId,
};
use crate::store::{AccountFilter, Store};
use crate::web::AppState;

use super::Model;
use super::auth::StaffUser;
use super::error::AdminError;
use super::forms::{
    BookingForm, BusForm, FormErrors, Outcome, RouteForm, UserChangeForm, UserCreationForm,
    store_error,
};
use super::templates::{
    ChangeFormTemplate, ChangeListTemplate, FieldView, FilterView, IndexTemplate, ModelView,
    RowView,
};

fn render(template: &impl Template) -> Result<Response, AdminError> {
    Ok(Html(template.render()?).into_response())
}

fn row(model: Model, url: String, id: i64, cells: Vec<String>) -> RowView {
    RowView {
        url,
        delete_url: model.delete_url(id),
        cells,
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

async fn count(store: &Store, model: Model) -> Result<i64, AdminError> {
    let count = match model {
        Model::Accounts => store.accounts().count(None).await?,
        Model::Passengers => store.accounts().count(Some(KindTag::Passenger)).await?,
        Model::Drivers => store.accounts().count(Some(KindTag::Driver)).await?,
        Model::Buses => store.buses().count().await?,
        Model::Routes => store.routes().count().await?,
        Model::Bookings => store.bookings().count().await?,
    };
    Ok(count)
}

/// Model list with record counts.
pub async fn index(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let mut models = Vec::with_capacity(Model::ALL.len());
    for model in Model::ALL {
        models.push(ModelView {
            name: model.name(),
            url: model.list_url(),
            count: count(&state.store, model).await?,
        });
    }

    render(&IndexTemplate {
        user: user.core.email.to_string(),
        models,
    })
}

// ============================================================================
// Accounts
// ============================================================================

/// Query string of the account list.
#[derive(Debug, Default, Deserialize)]
pub struct AccountListQuery {
    /// `true` or `false`; anything else shows everyone
    pub is_admin: Option<String>,
    /// Search text matched against email and national id
    pub q: Option<String>,
}

pub async fn account_list(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<Response, AdminError> {
    let is_admin = match query.is_admin.as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };
    let filter = AccountFilter {
        kind: None,
        is_admin,
        search: query.q.clone(),
        order_by_email: true,
    };
    let accounts = state.store.accounts().list(&filter).await?;

    let model = Model::Accounts;
    let rows = accounts
        .iter()
        .map(|a| {
            let core = &a.core;
            row(
                model,
                model.record_url(a.id.0),
                a.id.0,
                vec![
                    core.first_name.clone(),
                    core.last_name.clone(),
                    core.phone.to_string(),
                    core.email.to_string(),
                    core.national_id.to_string(),
                    yes_no(core.is_admin),
                ],
            )
        })
        .collect();

    let list_url = model.list_url();
    let filters = [("All", None), ("Yes", Some(true)), ("No", Some(false))]
        .into_iter()
        .map(|(label, value)| FilterView {
            label,
            url: match value {
                Some(v) => format!("{list_url}?is_admin={v}"),
                None => list_url.clone(),
            },
            selected: value == is_admin,
        })
        .collect();

    render(&ChangeListTemplate {
        user: user.core.email.to_string(),
        title: model.name().to_string(),
        add_url: Some(model.add_url()),
        columns: vec![
            "First name",
            "Last name",
            "Phone",
            "Email address",
            "National id",
            "Is admin",
        ],
        rows,
        search: Some(query.q.unwrap_or_default()),
        filters,
    })
}

fn account_noun(model: Model) -> String {
    match model {
        Model::Accounts => "user".to_string(),
        other => other.singular().to_lowercase(),
    }
}

/// Load an account, requiring the kind the model is restricted to.
async fn load_account(store: &Store, model: Model, id: i64) -> Result<Account, AdminError> {
    let accounts = store.accounts();
    let account = match model.account_kind() {
        Some(kind) => accounts.get_kind(AccountId(id), kind).await?,
        None => accounts.get(AccountId(id)).await?,
    };
    Ok(account)
}

fn account_add_page(
    model: Model,
    user: &str,
    form: &UserCreationForm,
    errors: &FormErrors,
) -> Result<Response, AdminError> {
    let mut fields = vec![
        FieldView::text("email", "Email address", &form.email).with_errors(errors),
        FieldView::text("phone", "Phone", &form.phone).with_errors(errors),
        FieldView::text("national_id", "National id", &form.national_id).with_errors(errors),
        FieldView::text("first_name", "First name", &form.first_name).with_errors(errors),
        FieldView::text("last_name", "Last name", &form.last_name).with_errors(errors),
    ];
    if model == Model::Drivers {
        fields.push(FieldView::text("staff_id", "Staff id", &form.staff_id).with_errors(errors));
    }
    fields.push(FieldView::password("password1", "Password").with_errors(errors));
    fields.push(FieldView::password("password2", "Password confirmation").with_errors(errors));

    render(&ChangeFormTemplate {
        user: user.to_string(),
        title: format!("Add {}", account_noun(model)),
        action: model.add_url(),
        list_url: model.list_url(),
        delete_url: None,
        fields,
        non_field_errors: errors.non_field(),
    })
}

pub async fn account_add_form(
    model: Model,
    StaffUser(user): StaffUser,
) -> Result<Response, AdminError> {
    account_add_page(
        model,
        user.core.email.as_str(),
        &UserCreationForm::default(),
        &FormErrors::default(),
    )
}

/// Create an account of the model's kind. Validation problems re-render the
/// form with 200.
pub async fn account_add(
    model: Model,
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Form(form): Form<UserCreationForm>,
) -> Result<Response, AdminError> {
    let kind = model.account_kind().unwrap_or(KindTag::Basic);
    match form.save(&state.accounts, kind).await? {
        Outcome::Saved(account) => {
            info!(id = %account.id, kind = %kind, by = %user.core.email, "account added from admin");
            Ok(Redirect::to(&model.record_url(account.id.0)).into_response())
        }
        Outcome::Invalid(errors) => {
            account_add_page(model, user.core.email.as_str(), &form, &errors)
        }
    }
}

fn account_change_page(
    model: Model,
    user: &str,
    account: &Account,
    form: &UserChangeForm,
    errors: &FormErrors,
) -> Result<Response, AdminError> {
    let id = account.id.0;
    let mut fields = vec![
        FieldView::text("first_name", "First name", &form.first_name).with_errors(errors),
        FieldView::text("last_name", "Last name", &form.last_name).with_errors(errors),
        FieldView::text("email", "Email address", &form.email).with_errors(errors),
        FieldView::readonly("password", "Password", &describe_password(&account.password)),
        FieldView::text("phone", "Phone", &form.phone).with_errors(errors),
        FieldView::text("national_id", "National id", &form.national_id).with_errors(errors),
    ];
    if account.kind.tag() == KindTag::Driver {
        fields.push(FieldView::text("staff_id", "Staff id", &form.staff_id).with_errors(errors));
    }
    fields.push(FieldView::checkbox("is_active", "Active", form.is_active.is_some()));
    fields.push(FieldView::checkbox("is_admin", "Is admin", form.is_admin.is_some()));

    render(&ChangeFormTemplate {
        user: user.to_string(),
        title: format!("Change {}", account_noun(model)),
        action: model.record_url(id),
        list_url: model.list_url(),
        delete_url: Some(model.delete_url(id)),
        fields,
        non_field_errors: errors.non_field(),
    })
}

pub async fn account_change_form(
    model: Model,
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AdminError> {
    let account = load_account(&state.store, model, id).await?;
    account_change_page(
        model,
        user.core.email.as_str(),
        &account,
        &UserChangeForm::from_account(&account),
        &FormErrors::default(),
    )
}

pub async fn account_change(
    model: Model,
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UserChangeForm>,
) -> Result<Response, AdminError> {
    let stored = load_account(&state.store, model, id).await?;
    let email = user.core.email.as_str();

    let mut account = stored.clone();
    if let Err(errors) = form.apply(&mut account) {
        return account_change_page(model, email, &stored, &form, &errors);
    }
    if let Err(e) = state.store.accounts().save(&account).await {
        let errors = store_error(e)?;
        return account_change_page(model, email, &stored, &form, &errors);
    }
    info!(id = %account.id, by = %user.core.email, "account changed from admin");
    Ok(Redirect::to(&model.list_url()).into_response())
}

/// Passengers or drivers, shown by their display string.
pub async fn kind_list(
    model: Model,
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let kind = model.account_kind().unwrap_or(KindTag::Passenger);
    let accounts = state
        .store
        .accounts()
        .list(&AccountFilter::kind(kind))
        .await?;

    let rows = accounts
        .iter()
        .map(|a| row(model, model.record_url(a.id.0), a.id.0, vec![a.to_string()]))
        .collect();

    render(&ChangeListTemplate {
        user: user.core.email.to_string(),
        title: model.name().to_string(),
        add_url: Some(model.add_url()),
        columns: vec![model.singular()],
        rows,
        search: None,
        filters: Vec::new(),
    })
}

// ============================================================================
// Buses
// ============================================================================

pub async fn bus_list(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let model = Model::Buses;
    let rows = state
        .store
        .buses()
        .list()
        .await?
        .iter()
        .map(|b| row(model, model.record_url(b.id.0), b.id.0, vec![b.to_string()]))
        .collect();

    render(&ChangeListTemplate {
        user: user.core.email.to_string(),
        title: model.name().to_string(),
        add_url: Some(model.add_url()),
        columns: vec![model.singular()],
        rows,
        search: None,
        filters: Vec::new(),
    })
}

async fn bus_page(
    state: &AppState,
    user: &str,
    id: Option<BusId>,
    form: &BusForm,
    errors: &FormErrors,
) -> Result<Response, AdminError> {
    let drivers = state
        .store
        .accounts()
        .list(&AccountFilter::kind(KindTag::Driver))
        .await?;
    let driver_choices = drivers.iter().map(|d| (d.id.to_string(), d.to_string()));

    let model = Model::Buses;
    render(&ChangeFormTemplate {
        user: user.to_string(),
        title: if id.is_some() { "Change bus" } else { "Add bus" }.to_string(),
        action: id.map_or_else(|| model.add_url(), |id| model.record_url(id.0)),
        list_url: model.list_url(),
        delete_url: id.map(|id| model.delete_url(id.0)),
        fields: vec![
            FieldView::text("bus_name", "Bus name", &form.bus_name).with_errors(errors),
            FieldView::select("driver", "Driver", &form.driver, driver_choices).with_errors(errors),
            FieldView::text("source", "Source", &form.source).with_errors(errors),
            FieldView::text("destination", "Destination", &form.destination).with_errors(errors),
            FieldView::number("capacity", "Capacity", &form.capacity).with_errors(errors),
            FieldView::number("booked", "Booked", &form.booked).with_errors(errors),
            FieldView::checkbox("is_full", "Is full", form.is_full.is_some()),
            FieldView::textarea("routes", "Routes", &form.routes).with_errors(errors),
            FieldView::number("rates", "Rates", &form.rates).with_errors(errors),
        ],
        non_field_errors: errors.non_field(),
    })
}

pub async fn bus_add_form(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let form = BusForm {
        rates: DEFAULT_RATES.to_string(),
        ..BusForm::default()
    };
    bus_page(&state, user.core.email.as_str(), None, &form, &FormErrors::default()).await
}

pub async fn bus_add(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Form(form): Form<BusForm>,
) -> Result<Response, AdminError> {
    let email = user.core.email.as_str();
    let bus = match form.clean() {
        Ok(bus) => bus,
        Err(errors) => return bus_page(&state, email, None, &form, &errors).await,
    };
    match state.store.buses().insert(&bus).await {
        Ok(bus) => {
            info!(id = %bus.id, by = %email, "bus added from admin");
            Ok(Redirect::to(&Model::Buses.list_url()).into_response())
        }
        Err(e) => bus_page(&state, email, None, &form, &store_error(e)?).await,
    }
}

pub async fn bus_change_form(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AdminError> {
    let bus = state.store.buses().get(BusId(id)).await?;
    let form = BusForm::from_bus(&bus);
    bus_page(&state, user.core.email.as_str(), Some(bus.id), &form, &FormErrors::default()).await
}

pub async fn bus_change(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<BusForm>,
) -> Result<Response, AdminError> {
    let email = user.core.email.as_str();
    let id = state.store.buses().get(BusId(id)).await?.id;
    let bus = match form.clean_for(id) {
        Ok(bus) => bus,
        Err(errors) => return bus_page(&state, email, Some(id), &form, &errors).await,
    };
    if let Err(e) = state.store.buses().save(&bus).await {
        return bus_page(&state, email, Some(id), &form, &store_error(e)?).await;
    }
    Ok(Redirect::to(&Model::Buses.list_url()).into_response())
}

// ============================================================================
// Routes
// ============================================================================

fn city_choices() -> impl Iterator<Item = (String, String)> {
    City::ALL
        .into_iter()
        .map(|c| (c.as_str().to_string(), c.label().to_string()))
}

pub async fn route_list(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let model = Model::Routes;
    let rows = state
        .store
        .routes()
        .list()
        .await?
        .iter()
        .map(|r| {
            row(
                model,
                model.record_url(r.id.0),
                r.id.0,
                vec![r.to_string(), r.cost.to_string()],
            )
        })
        .collect();

    render(&ChangeListTemplate {
        user: user.core.email.to_string(),
        title: model.name().to_string(),
        add_url: Some(model.add_url()),
        columns: vec![model.singular(), "Cost"],
        rows,
        search: None,
        filters: Vec::new(),
    })
}

fn route_page(
    user: &str,
    id: Option<RouteId>,
    form: &RouteForm,
    errors: &FormErrors,
) -> Result<Response, AdminError> {
    let model = Model::Routes;
    render(&ChangeFormTemplate {
        user: user.to_string(),
        title: if id.is_some() { "Change route" } else { "Add route" }.to_string(),
        action: id.map_or_else(|| model.add_url(), |id| model.record_url(id.0)),
        list_url: model.list_url(),
        delete_url: id.map(|id| model.delete_url(id.0)),
        fields: vec![
            FieldView::select("source", "Source", &form.source, city_choices()).with_errors(errors),
            FieldView::select("destination", "Destination", &form.destination, city_choices())
                .with_errors(errors),
            FieldView::number("cost", "Cost", &form.cost).with_errors(errors),
        ],
        non_field_errors: errors.non_field(),
    })
}

pub async fn route_add_form(StaffUser(user): StaffUser) -> Result<Response, AdminError> {
    route_page(
        user.core.email.as_str(),
        None,
        &RouteForm::default(),
        &FormErrors::default(),
    )
}

pub async fn route_add(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Form(form): Form<RouteForm>,
) -> Result<Response, AdminError> {
    let email = user.core.email.as_str();
    let route = match form.clean() {
        Ok(route) => route,
        Err(errors) => return route_page(email, None, &form, &errors),
    };
    let route = state.store.routes().insert(&route).await?;
    info!(id = %route.id, by = %email, "route added from admin");
    Ok(Redirect::to(&Model::Routes.list_url()).into_response())
}

pub async fn route_change_form(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AdminError> {
    let route = state.store.routes().get(RouteId(id)).await?;
    route_page(
        user.core.email.as_str(),
        Some(route.id),
        &RouteForm::from_route(&route),
        &FormErrors::default(),
    )
}

pub async fn route_change(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<RouteForm>,
) -> Result<Response, AdminError> {
    let id = state.store.routes().get(RouteId(id)).await?.id;
    let route = match form.clean_for(id) {
        Ok(route) => route,
        Err(errors) => return route_page(user.core.email.as_str(), Some(id), &form, &errors),
    };
    state.store.routes().save(&route).await?;
    Ok(Redirect::to(&Model::Routes.list_url()).into_response())
}

// ============================================================================
// Bookings
// ============================================================================

pub async fn booking_list(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let model = Model::Bookings;
    let rows = state
        .store
        .bookings()
        .list()
        .await?
        .iter()
        .map(|b| {
            row(
                model,
                model.record_url(b.id.0),
                b.id.0,
                vec![
                    format!("Booking object ({})", b.id),
                    b.status.label().to_string(),
                    b.cost.to_string(),
                    b.departure_date.format("%Y-%m-%d %H:%M").to_string(),
                ],
            )
        })
        .collect();

    render(&ChangeListTemplate {
        user: user.core.email.to_string(),
        title: model.name().to_string(),
        add_url: Some(model.add_url()),
        columns: vec![model.singular(), "Status", "Cost", "Departure date"],
        rows,
        search: None,
        filters: Vec::new(),
    })
}

async fn booking_page(
    state: &AppState,
    user: &str,
    id: Option<BookingId>,
    form: &BookingForm,
    errors: &FormErrors,
) -> Result<Response, AdminError> {
    let store = &state.store;
    let passengers = store
        .accounts()
        .list(&AccountFilter::kind(KindTag::Passenger).ordered_by_email())
        .await?;
    let routes = store.routes().list().await?;
    let buses = store.buses().list().await?;

    let passenger_choices = passengers
        .iter()
        .map(|p| (p.id.to_string(), p.to_string()));
    let route_choices = routes.iter().map(|r| (r.id.to_string(), r.to_string()));
    let bus_choices = buses.iter().map(|b| (b.id.to_string(), b.to_string()));
    let status_choices = BookingStatus::ALL
        .into_iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()));

    let model = Model::Bookings;
    render(&ChangeFormTemplate {
        user: user.to_string(),
        title: if id.is_some() { "Change booking" } else { "Add booking" }.to_string(),
        action: id.map_or_else(|| model.add_url(), |id| model.record_url(id.0)),
        list_url: model.list_url(),
        delete_url: id.map(|id| model.delete_url(id.0)),
        fields: vec![
            FieldView::select("passenger", "Passenger", &form.passenger, passenger_choices)
                .with_errors(errors),
            FieldView::select("route", "Route", &form.route, route_choices).with_errors(errors),
            FieldView::select("bus", "Bus", &form.bus, bus_choices).with_errors(errors),
            FieldView::number("cost", "Cost", &form.cost).with_errors(errors),
            FieldView::text("payment_id", "Payment id", &form.payment_id).with_errors(errors),
            FieldView::datetime("departure_date", "Departure date", &form.departure_date)
                .with_errors(errors),
            FieldView::select("status", "Status", &form.status, status_choices).with_errors(errors),
        ],
        non_field_errors: errors.non_field(),
    })
}

pub async fn booking_add_form(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> Result<Response, AdminError> {
    let form = BookingForm {
        status: BookingStatus::default().as_str().to_string(),
        ..BookingForm::default()
    };
    booking_page(&state, user.core.email.as_str(), None, &form, &FormErrors::default()).await
}

pub async fn booking_add(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Form(form): Form<BookingForm>,
) -> Result<Response, AdminError> {
    let email = user.core.email.as_str();
    let booking = match form.clean() {
        Ok(booking) => booking,
        Err(errors) => return booking_page(&state, email, None, &form, &errors).await,
    };
    match state.store.bookings().insert(&booking).await {
        Ok(booking) => {
            info!(id = %booking.id, by = %email, "booking added from admin");
            Ok(Redirect::to(&Model::Bookings.list_url()).into_response())
        }
        Err(e) => booking_page(&state, email, None, &form, &store_error(e)?).await,
    }
}

pub async fn booking_change_form(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AdminError> {
    let booking = state.store.bookings().get(BookingId(id)).await?;
    let form = BookingForm::from_booking(&booking);
    booking_page(
        &state,
        user.core.email.as_str(),
        Some(booking.id),
        &form,
        &FormErrors::default(),
    )
    .await
}

pub async fn booking_change(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<BookingForm>,
) -> Result<Response, AdminError> {
    let email = user.core.email.as_str();
    let id = state.store.bookings().get(BookingId(id)).await?.id;
    let booking = match form.clean_for(id) {
        Ok(booking) => booking,
        Err(errors) => return booking_page(&state, email, Some(id), &form, &errors).await,
    };
    if let Err(e) = state.store.bookings().save(&booking).await {
        return booking_page(&state, email, Some(id), &form, &store_error(e)?).await;
    }
    Ok(Redirect::to(&Model::Bookings.list_url()).into_response())
}

// ============================================================================
// Delete
// ============================================================================

/// Delete a record and return to its list. Referenced records answer 409.
pub async fn delete(
    model: Model,
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AdminError> {
    let store = &state.store;
    match model {
        Model::Accounts | Model::Passengers | Model::Drivers => {
            let account = load_account(store, model, id).await?;
            store.accounts().delete(account.id, account.kind.tag()).await?;
        }
        Model::Buses => store.buses().delete(BusId(id)).await?,
        Model::Routes => store.routes().delete(RouteId(id)).await?,
        Model::Bookings => store.bookings().delete(BookingId(id)).await?,
    }

    info!(model = model.slug(), id, by = %user.core.email, "deleted from admin");
    Ok(Redirect::to(&model.list_url()))
}
