//! Schema-on-read with an observable fallback to defaults.

use core::fmt;

use serde::de::DeserializeOwned;

/// Semantic checks applied after JSON decoding succeeded.
pub trait Validate {
    /// Describe the first violated rule, if any.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value must be discarded.
    fn validate(&self) -> Result<(), String>;
}

/// Why a default was used instead of the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    /// Nothing was stored.
    Missing,
    /// The stored value is not valid JSON of the expected shape.
    Malformed(String),
    /// The stored value decoded but broke an invariant.
    Invalid(String),
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::Malformed(e) => write!(f, "malformed: {e}"),
            Self::Invalid(e) => write!(f, "invalid: {e}"),
        }
    }
}

/// Outcome of reading a persisted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The stored value was usable.
    Value(T),
    /// The stored value was absent or unusable.
    Default {
        /// What went wrong.
        reason: DefaultReason,
    },
}

impl<T> Parsed<T> {
    /// Whether the default had to be used.
    #[must_use]
    pub const fn was_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }

    /// The reason a default was used.
    #[must_use]
    pub const fn reason(&self) -> Option<&DefaultReason> {
        match self {
            Self::Value(_) => None,
            Self::Default { reason } => Some(reason),
        }
    }
}

impl<T: Default> Parsed<T> {
    /// The stored value, or `T::default()`.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Default { .. } => T::default(),
        }
    }
}

/// Decode and validate `raw`, falling back to a default on any problem.
#[must_use]
pub fn parse_or_default<T>(raw: Option<&str>) -> Parsed<T>
where
    T: DeserializeOwned + Validate,
{
    let Some(raw) = raw else {
        return Parsed::Default {
            reason: DefaultReason::Missing,
        };
    };

    match serde_json::from_str::<T>(raw) {
        Ok(value) => match value.validate() {
            Ok(()) => Parsed::Value(value),
            Err(reason) => Parsed::Default {
                reason: DefaultReason::Invalid(reason),
            },
        },
        Err(e) => Parsed::Default {
            reason: DefaultReason::Malformed(e.to_string()),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Eq, Deserialize)]
    struct Counter {
        value: i32,
    }

    impl Validate for Counter {
        fn validate(&self) -> Result<(), String> {
            if self.value < 0 {
                return Err("negative".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn test_missing() {
        let parsed = parse_or_default::<Counter>(None);
        assert_eq!(parsed.reason(), Some(&DefaultReason::Missing));
        assert_eq!(parsed.into_inner(), Counter::default());
    }

    #[test]
    fn test_malformed() {
        let parsed = parse_or_default::<Counter>(Some("{not json"));
        assert!(matches!(parsed.reason(), Some(DefaultReason::Malformed(_))));
        assert!(parsed.was_default());
    }

    #[test]
    fn test_invalid() {
        let parsed = parse_or_default::<Counter>(Some(r#"{"value": -1}"#));
        assert_eq!(
            parsed.reason(),
            Some(&DefaultReason::Invalid("negative".to_string()))
        );
    }

    #[test]
    fn test_value() {
        let parsed = parse_or_default::<Counter>(Some(r#"{"value": 3}"#));
        assert!(!parsed.was_default());
        assert_eq!(parsed.into_inner(), Counter { value: 3 });
    }
}
