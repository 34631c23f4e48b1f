//! Bitsnap Core - Shared types library.
//!
//! This crate provides common types used across the Bitsnap checkout components:
//! - `checkout` - Cart store, pricing quotes and one-click payment sheets
//! - `cli` - Command-line driver for the checkout library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money amounts, countries and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
