//! Bitsnap checkout library.
//!
//! Persisted cart state, backend pricing quotes and the Apple Pay / Google
//! Pay payment sheet state machines, all hanging off a [`CheckoutContext`].
//!
//! ```rust,ignore
//! let ctx = CheckoutContext::from_config(CheckoutConfig::from_env()?)?;
//! let cart = ctx.cart();
//! cart.add_product("prod_1", 2, None)?;
//! let url = cart.redirect_to_next_step().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod link;
pub mod pricing;
pub mod products;
pub mod store;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use cart::{CartShell, DirectPurchase, Subtotal};
pub use config::{CheckoutConfig, ConfigError};
pub use context::CheckoutContext;
pub use error::{CheckoutError, ErrorKind};
pub use store::{CheckoutStorage, CheckoutStore, FileStorage, MemoryStorage};
