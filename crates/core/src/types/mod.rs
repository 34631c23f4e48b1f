//! Core types for Bitsnap.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod country;
pub mod email;
pub mod id;
pub mod price;

pub use country::{CountryCode, CountryCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{DEFAULT_CURRENCY, MinorUnits, format_currency};
