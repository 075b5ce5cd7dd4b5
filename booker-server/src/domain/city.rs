//! Towns served by the route network.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::DomainError;

/// One of the fixed route endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Nairobi,
    Kisumu,
    Nakuru,
    Eldoret,
    Mombasa,
    Kisii,
}

impl City {
    /// Every city, in menu order.
    pub const ALL: [City; 6] = [
        City::Nairobi,
        City::Kisumu,
        City::Nakuru,
        City::Eldoret,
        City::Mombasa,
        City::Kisii,
    ];

    /// Stored and serialized value.
    pub fn as_str(self) -> &'static str {
        match self {
            City::Nairobi => "nairobi",
            City::Kisumu => "kisumu",
            City::Nakuru => "nakuru",
            City::Eldoret => "eldoret",
            City::Mombasa => "mombasa",
            City::Kisii => "kisii",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            City::Nairobi => "Nairobi",
            City::Kisumu => "Kisumu",
            City::Nakuru => "Nakuru",
            City::Eldoret => "Eldoret",
            City::Mombasa => "Mombasa",
            City::Kisii => "Kisii",
        }
    }

    /// Parse a stored value.
    ///
    /// Older rows carry `Mombasa` capitalised, so that spelling is accepted
    /// too. Nothing else is case-folded.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "nairobi" => Ok(City::Nairobi),
            "kisumu" => Ok(City::Kisumu),
            "nakuru" => Ok(City::Nakuru),
            "eldoret" => Ok(City::Eldoret),
            "mombasa" | "Mombasa" => Ok(City::Mombasa),
            "kisii" => Ok(City::Kisii),
            other => Err(DomainError::UnknownCity(other.to_string())),
        }
    }
}

impl FromStr for City {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::parse(s)
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for City {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all() {
        for city in City::ALL {
            assert_eq!(City::parse(city.as_str()), Ok(city));
        }
    }

    #[test]
    fn legacy_mombasa_spelling() {
        assert_eq!(City::parse("Mombasa"), Ok(City::Mombasa));
        assert_eq!(City::Mombasa.as_str(), "mombasa");
    }

    #[test]
    fn reject_unknown() {
        assert!(City::parse("london").is_err());
        assert!(City::parse("NAIROBI").is_err());
        assert!(City::parse("").is_err());
    }

    #[test]
    fn serializes_as_value() {
        assert_eq!(serde_json::to_string(&City::Kisii).unwrap(), "\"kisii\"");
    }
}
