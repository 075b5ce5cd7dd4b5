//! CRUD handlers, one module per collection.
//!
//! Each collection answers `GET`/`POST` on `/{name}/` and
//! `GET`/`PUT`/`PATCH`/`DELETE` on `/{name}/{id}/`.

pub mod accounts;
pub mod bookings;
pub mod buses;
pub mod routes;
