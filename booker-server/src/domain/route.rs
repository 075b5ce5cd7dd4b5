//! Priced routes between served towns.

use std::fmt;

use super::city::City;
use super::error::{DomainError, finite};
use super::ids::RouteId;

/// A validated route that has not been stored yet.
///
/// Several routes may share the same source and destination.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub source: City,
    pub destination: City,
    pub cost: f64,
}

impl NewRoute {
    /// Validate raw route fields.
    pub fn new(source: &str, destination: &str, cost: f64) -> Result<Self, DomainError> {
        Ok(Self {
            source: City::parse(source)?,
            destination: City::parse(destination)?,
            cost: finite("cost", cost)?,
        })
    }

    /// Attach the id assigned by the store.
    pub fn with_id(self, id: RouteId) -> Route {
        Route {
            id,
            source: self.source,
            destination: self.destination,
            cost: self.cost,
        }
    }
}

/// A stored route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub source: City,
    pub destination: City,
    pub cost: f64,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source.label(), self.destination.label())
    }
}
