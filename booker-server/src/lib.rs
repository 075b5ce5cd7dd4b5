//! Bus ticket booking server.
//!
//! A JSON API over passengers, drivers, buses, routes and bookings, with
//! hyperlinked relations, plus a staff-only HTML administration console.
//! Records live in SQLite.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod config;
pub mod domain;
pub mod store;
pub mod web;
