//! Census tract identifiers.
//!
//! A tract GEOID is the 2-digit state FIPS, 3-digit county FIPS, and
//! 6-digit tract code concatenated into an 11-digit string. Source tables
//! frequently store it as a number, which drops the leading zero of
//! states below 10, so parsing left-pads to 11 digits.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Number of digits in a census tract GEOID.
pub const GEOID_LEN: usize = 11;

/// An 11-digit, zero-padded census tract identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "GeoidRepr", into = "String")]
pub struct Geoid(String);

impl Geoid {
    /// Parses a GEOID, left-padding shorter digit strings with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGeoid`] if the trimmed input is empty,
    /// longer than 11 characters, or contains anything but ASCII digits.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let trimmed = value.trim();
        if trimmed.is_empty()
            || trimmed.len() > GEOID_LEN
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ModelError::InvalidGeoid {
                value: value.to_string(),
            });
        }

        Ok(Self(format!("{trimmed:0>GEOID_LEN$}")))
    }

    /// Builds a GEOID from its numeric form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGeoid`] if the number has more than 11
    /// digits.
    pub fn from_number(value: u64) -> Result<Self, ModelError> {
        Self::parse(&value.to_string())
    }

    /// Returns the 11-digit string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit state FIPS code.
    #[must_use]
    pub fn state_fips(&self) -> &str {
        &self.0[..2]
    }

    /// Three-digit county FIPS code.
    #[must_use]
    pub fn county_fips(&self) -> &str {
        &self.0[2..5]
    }
}

impl std::fmt::Display for Geoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Geoid {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Geoid> for String {
    fn from(value: Geoid) -> Self {
        value.0
    }
}

/// Wire forms accepted for a GEOID.
#[derive(Deserialize)]
#[serde(untagged)]
enum GeoidRepr {
    Text(String),
    Number(u64),
}

impl TryFrom<GeoidRepr> for Geoid {
    type Error = ModelError;

    fn try_from(value: GeoidRepr) -> Result<Self, Self::Error> {
        match value {
            GeoidRepr::Text(s) => Self::parse(&s),
            GeoidRepr::Number(n) => Self::from_number(n),
        }
    }
}
