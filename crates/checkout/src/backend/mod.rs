//! Bitsnap backend client.
//!
//! # Architecture
//!
//! - The [`Backend`] trait has one method per endpoint, so the cart logic can
//!   be driven against a scripted fake in tests
//! - [`HttpBackend`] talks JSON over HTTP to the public-commerce endpoints
//!   and the Connect unary protocol (binary protobuf via `prost`) to
//!   `public.v1.PublicApiService`
//! - The backend is the only source of money amounts; nothing here computes
//!   prices

mod conversions;
mod http;
#[allow(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
pub mod rpc;

use async_trait::async_trait;
use bitsnap_core::ProductId;
use secrecy::SecretString;
use thiserror::Error;

pub use http::HttpBackend;

use crate::link::LinkRequest;
use crate::pricing::QuoteRequest;
use crate::types::{Country, GooglePayConfig, PreOrderQuote, ProductDetails};
use crate::wallet::OneClickAuthorization;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Protobuf decoding failed.
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Connect RPC error.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Connect error code (e.g. `invalid_argument`).
        code: String,
        /// Error message.
        message: String,
    },

    /// Response is missing a field the contract requires.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// Backend reported the request as unsuccessful.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Which one-click wallets the project has enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OneClickAvailability {
    pub apple_pay: bool,
    pub google_pay: bool,
    /// Gateway configuration, present only when Google Pay is usable.
    pub google_pay_config: Option<GooglePayConfig>,
}

/// Result of a one-click authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationOutcome {
    pub is_success: bool,
    pub redirect_url: Option<String>,
}

/// A hosted payment page created from a [`LinkRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub url: String,
    pub session_id: Option<String>,
}

/// The remote operations the checkout depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch products by id. Ids may name variants.
    async fn products(&self, ids: &[ProductId]) -> Result<Vec<ProductDetails>, BackendError>;

    /// Countries the project ships to.
    async fn countries(&self) -> Result<Vec<Country>, BackendError>;

    /// Price the given cart composition.
    async fn pre_order_details(&self, request: &QuoteRequest) -> Result<PreOrderQuote, BackendError>;

    /// Which one-click wallets are enabled.
    async fn one_click_availability(&self) -> Result<OneClickAvailability, BackendError>;

    /// Relay an Apple Pay merchant validation, returning the opaque session blob.
    async fn validate_apple_pay_merchant(&self, validation_url: &str) -> Result<String, BackendError>;

    /// Authorize a wallet payment.
    async fn authorize_one_click_payment(
        &self,
        authorization: &OneClickAuthorization,
    ) -> Result<AuthorizationOutcome, BackendError>;

    /// Create a hosted payment link.
    async fn create_payment_link(&self, link: &LinkRequest) -> Result<PaymentLink, BackendError>;

    /// Create a checkout through the automatic, API-key authenticated endpoint.
    async fn create_automatic_checkout(
        &self,
        link: &LinkRequest,
        api_key: Option<&SecretString>,
        test_mode: bool,
    ) -> Result<String, BackendError>;
}
