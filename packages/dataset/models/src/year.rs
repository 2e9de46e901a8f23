//! Census years covered by the population table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A census year column of the population table (e.g. `2022`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(u16);

/// The fixed set of years the world population dataset publishes.
pub const KNOWN_YEARS: [Year; 8] = [
    Year(1970),
    Year(1980),
    Year(1990),
    Year(2000),
    Year(2010),
    Year(2015),
    Year(2020),
    Year(2022),
];

impl Year {
    #[must_use]
    pub const fn new(year: u16) -> Self {
        Self(year)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns `true` if this year is one of [`KNOWN_YEARS`].
    #[must_use]
    pub fn is_known(self) -> bool {
        KNOWN_YEARS.contains(&self)
    }
}

impl From<u16> for Year {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string carries no leading year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearError(String);

impl fmt::Display for ParseYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no year in '{}'", self.0)
    }
}

impl std::error::Error for ParseYearError {}

impl FromStr for Year {
    type Err = ParseYearError;

    /// Parses either a bare year (`"2022"`) or a wide-format column label
    /// whose first token is the year (`"2022 Population"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.split_whitespace().next().unwrap_or("");
        if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseYearError(s.to_owned()));
        }
        token
            .parse::<u16>()
            .map(Self)
            .map_err(|_| ParseYearError(s.to_owned()))
    }
}
