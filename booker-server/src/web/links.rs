//! Hyperlinks between records.
//!
//! Every record is identified in JSON by an absolute URL of the form
//! `{base}/{resource}/{id}/`. Relations are written the same way on output
//! and accepted the same way on input.

use std::fmt;

use axum::http::{HeaderMap, header};

/// The five record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Passenger,
    Driver,
    Bus,
    Routes,
    Booking,
}

impl Resource {
    /// Every collection, in API root order.
    pub const ALL: [Resource; 5] = [
        Resource::Passenger,
        Resource::Driver,
        Resource::Bus,
        Resource::Routes,
        Resource::Booking,
    ];

    /// URL path segment.
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Passenger => "passenger",
            Resource::Driver => "driver",
            Resource::Bus => "bus",
            Resource::Routes => "routes",
            Resource::Booking => "booking",
        }
    }

    fn from_segment(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.segment() == s)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Errors from resolving a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Invalid hyperlink - No URL match: {0:?}")]
    Malformed(String),

    #[error("Invalid hyperlink - Incorrect URL match: expected a {expected} link, got {url:?}")]
    WrongResource { expected: Resource, url: String },
}

/// Builds absolute URLs from a fixed base.
#[derive(Debug, Clone)]
pub struct Links {
    base: String,
}

impl Links {
    /// `base` is scheme and authority, e.g. `http://localhost:8000`.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Derive the base from the request's `Host` header, falling back to
    /// `localhost` when it is missing.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        Self::new(format!("http://{host}"))
    }

    /// URL of a collection.
    pub fn collection(&self, resource: Resource) -> String {
        format!("{}/{}/", self.base, resource)
    }

    /// URL of one record.
    pub fn record(&self, resource: Resource, id: impl fmt::Display) -> String {
        format!("{}/{}/{}/", self.base, resource, id)
    }
}

/// Extract the record id from a hyperlink.
///
/// Only the trailing `/{resource}/{id}/` is inspected, so absolute URLs
/// and bare paths both resolve. The trailing slash is optional.
pub fn resolve(url: &str, expected: Resource) -> Result<i64, LinkError> {
    let malformed = || LinkError::Malformed(url.to_string());

    let path = url.trim().trim_end_matches('/');
    let (rest, id) = path.rsplit_once('/').ok_or_else(malformed)?;
    let segment = rest.rsplit('/').next().ok_or_else(malformed)?;

    let resource = Resource::from_segment(segment).ok_or_else(malformed)?;
    let id: i64 = id.parse().map_err(|_| malformed())?;

    if resource != expected {
        return Err(LinkError::WrongResource {
            expected,
            url: url.to_string(),
        });
    }
    Ok(id)
}
