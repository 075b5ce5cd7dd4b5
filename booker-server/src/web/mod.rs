//! Web layer for the booking API.
//!
//! Serves the five record collections as hyperlinked JSON.

mod dto;
mod error;
mod links;
mod resources;
mod routes;
mod state;

pub use dto::*;
pub use error::AppError;
pub use links::{LinkError, Links, Resource, resolve as resolve_link};
pub use routes::create_router;
pub use state::AppState;
