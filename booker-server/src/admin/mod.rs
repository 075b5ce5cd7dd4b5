//! Staff-only administration console.
//!
//! Server-rendered HTML pages for browsing and editing every record type.
//! Every page requires HTTP Basic credentials of an active staff account
//! that the configured policy lets into the `bookerserver` application.
//!
//! | Path | Page |
//! |------|------|
//! | `/admin/` | Model index with counts |
//! | `/admin/accounts/` | Accounts, filterable by `is_admin`, searchable with `q` |
//! | `/admin/passengers/`, `/admin/drivers/` | Accounts of one kind; drivers carry a staff id |
//! | `/admin/{buses,routes,bookings}/` | Record lists |
//! | `/admin/{model}/add/` | Add form |
//! | `/admin/{model}/:id/` | Change form |
//! | `/admin/{model}/:id/delete/` | Delete (POST) |

mod auth;
mod error;
mod forms;
mod templates;
mod views;


use axum::extract::{Path, State};
use axum::routing::{MethodRouter, get, post};
use axum::{Form, Router};

use crate::domain::KindTag;
use crate::web::AppState;

use forms::{UserChangeForm, UserCreationForm};

pub use auth::{APP_LABEL, StaffUser};
pub use error::AdminError;

/// A record type shown in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Accounts,
    Passengers,
    Drivers,
    Buses,
    Routes,
    Bookings,
}

impl Model {
    /// Index page order.
    pub const ALL: [Model; 6] = [
        Model::Accounts,
        Model::Passengers,
        Model::Drivers,
        Model::Buses,
        Model::Routes,
        Model::Bookings,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Model::Accounts => "accounts",
            Model::Passengers => "passengers",
            Model::Drivers => "drivers",
            Model::Buses => "buses",
            Model::Routes => "routes",
            Model::Bookings => "bookings",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Model::Accounts => "Accounts",
            Model::Passengers => "Passengers",
            Model::Drivers => "Drivers",
            Model::Buses => "Buses",
            Model::Routes => "Routes",
            Model::Bookings => "Bookings",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Model::Accounts => "Account",
            Model::Passengers => "Passenger",
            Model::Drivers => "Driver",
            Model::Buses => "Bus",
            Model::Routes => "Route",
            Model::Bookings => "Booking",
        }
    }

    pub fn list_url(self) -> String {
        format!("/admin/{}/", self.slug())
    }

    pub fn add_url(self) -> String {
        format!("/admin/{}/add/", self.slug())
    }

    pub fn record_url(self, id: i64) -> String {
        format!("/admin/{}/{id}/", self.slug())
    }

    pub fn delete_url(self, id: i64) -> String {
        format!("/admin/{}/{id}/delete/", self.slug())
    }

    /// The account kind this model is restricted to. `None` for
    /// [`Model::Accounts`], which covers every kind.
    pub fn account_kind(self) -> Option<KindTag> {
        match self {
            Model::Passengers => Some(KindTag::Passenger),
            Model::Drivers => Some(KindTag::Driver),
            _ => None,
        }
    }
}

fn delete_route(model: Model) -> MethodRouter<AppState> {
    post(
        move |user: StaffUser, state: State<AppState>, id: Path<i64>| {
            views::delete(model, user, state, id)
        },
    )
}

fn kind_route(model: Model) -> MethodRouter<AppState> {
    get(move |user: StaffUser, state: State<AppState>| views::kind_list(model, user, state))
}

fn account_add_route(model: Model) -> MethodRouter<AppState> {
    get(move |user: StaffUser| views::account_add_form(model, user)).post(
        move |user: StaffUser, state: State<AppState>, form: Form<UserCreationForm>| {
            views::account_add(model, user, state, form)
        },
    )
}

fn account_change_route(model: Model) -> MethodRouter<AppState> {
    get(
        move |user: StaffUser, state: State<AppState>, id: Path<i64>| {
            views::account_change_form(model, user, state, id)
        },
    )
    .post(
        move |user: StaffUser,
              state: State<AppState>,
              id: Path<i64>,
              form: Form<UserChangeForm>| {
            views::account_change(model, user, state, id, form)
        },
    )
}

/// Console routes, mounted under `/admin/`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(views::index))
        // Accounts
        .route("/admin/accounts/", get(views::account_list))
        .route("/admin/accounts/add/", account_add_route(Model::Accounts))
        .route("/admin/accounts/:id/", account_change_route(Model::Accounts))
        .route("/admin/accounts/:id/delete/", delete_route(Model::Accounts))
        .route("/admin/passengers/", kind_route(Model::Passengers))
        .route("/admin/passengers/add/", account_add_route(Model::Passengers))
        .route("/admin/passengers/:id/", account_change_route(Model::Passengers))
        .route("/admin/passengers/:id/delete/", delete_route(Model::Passengers))
        .route("/admin/drivers/", kind_route(Model::Drivers))
        .route("/admin/drivers/add/", account_add_route(Model::Drivers))
        .route("/admin/drivers/:id/", account_change_route(Model::Drivers))
        .route("/admin/drivers/:id/delete/", delete_route(Model::Drivers))
        // Buses
        .route("/admin/buses/", get(views::bus_list))
        .route(
            "/admin/buses/add/",
            get(views::bus_add_form).post(views::bus_add),
        )
        .route(
            "/admin/buses/:id/",
            get(views::bus_change_form).post(views::bus_change),
        )
        .route("/admin/buses/:id/delete/", delete_route(Model::Buses))
        // Routes
        .route("/admin/routes/", get(views::route_list))
        .route(
            "/admin/routes/add/",
            get(views::route_add_form).post(views::route_add),
        )
        .route(
            "/admin/routes/:id/",
            get(views::route_change_form).post(views::route_change),
        )
        .route("/admin/routes/:id/delete/", delete_route(Model::Routes))
        // Bookings
        .route("/admin/bookings/", get(views::booking_list))
        .route(
            "/admin/bookings/add/",
            get(views::booking_add_form).post(views::booking_add),
        )
        .route(
            "/admin/bookings/:id/",
            get(views::booking_change_form).post(views::booking_change),
        )
        .route("/admin/bookings/:id/delete/", delete_route(Model::Bookings))
}
