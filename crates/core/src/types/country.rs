//! ISO 3166-1 alpha-2 country codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CountryCodeError {
    /// The code is not exactly two ASCII letters.
    #[error("country code must be two ASCII letters, got `{0}`")]
    Invalid(String),
}

/// A two-letter country code, normalised to upper case.
///
/// ```
/// use bitsnap_core::CountryCode;
///
/// assert_eq!(CountryCode::parse("pl").unwrap().as_str(), "PL");
/// assert!(CountryCode::parse("POL").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse and normalise a country code.
    ///
    /// # Errors
    ///
    /// Returns [`CountryCodeError::Invalid`] unless the trimmed input is two
    /// ASCII letters.
    pub fn parse(input: &str) -> Result<Self, CountryCodeError> {
        let trimmed = input.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(CountryCodeError::Invalid(input.to_owned()))
        }
    }

    /// Returns the upper-case code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Poland, the market every cart starts in.
impl Default for CountryCode {
    fn default() -> Self {
        Self("PL".to_owned())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}
