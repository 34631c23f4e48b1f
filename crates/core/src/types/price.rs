//! Type-safe money amounts expressed in minor currency units.
//!
//! Every amount that crosses the backend boundary is an integer number of
//! minor units (grosz, cents). Conversion to major units happens only for
//! display, always rounding half-up to two decimal places.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency used when neither the backend nor the product provides one.
pub const DEFAULT_CURRENCY: &str = "PLN";

/// A money amount in the smallest currency unit (e.g., grosz for PLN).
///
/// ## Examples
///
/// ```
/// use bitsnap_core::MinorUnits;
///
/// assert_eq!(MinorUnits::new(1050).display(), "10.50");
/// assert_eq!(MinorUnits::new(-500).display(), "-5.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw minor-unit value.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Convert to a major-unit decimal (e.g., 1050 -> 10.50).
    #[must_use]
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Convert a major-unit decimal into minor units, rounding half-up.
    ///
    /// Returns `None` if the value does not fit into an `i64`.
    #[must_use]
    pub fn from_major(major: Decimal) -> Option<Self> {
        major
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }

    /// Convert a major-unit float (as entered by merchants) into minor units.
    #[must_use]
    pub fn from_major_f64(major: f64) -> Option<Self> {
        Decimal::from_f64(major).and_then(Self::from_major)
    }

    /// Multiply by a line quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Format as a two-decimal major-unit string, rounding half-up.
    #[must_use]
    pub fn display(self) -> String {
        let mut major = self
            .to_major()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        major.rescale(2);
        major.to_string()
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for MinorUnits {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// Format an amount with its currency code for display (e.g., "10.50 PLN").
#[must_use]
pub fn format_currency(amount: MinorUnits, currency: &str) -> String {
    let currency = if currency.is_empty() {
        DEFAULT_CURRENCY
    } else {
        currency
    };
    format!("{} {currency}", amount.display())
}
