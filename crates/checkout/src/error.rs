//! Unified error handling with Sentry integration.
//!
//! Failures are returned as values. Read paths (product resolution, country
//! list) degrade to empty results and never produce a `CheckoutError`; the
//! transactional paths (quotes, merchant validation, authorization, payment
//! links) propagate one so the caller has to branch on it.

use thiserror::Error;

use crate::backend::BackendError;
use crate::store::StorageError;

/// Coarse failure taxonomy exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that cannot be done with this input.
    BadInput,
    /// Something failed on our side or the backend's.
    Internal,
}

/// Checkout-level error type.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Rejected input, e.g. `cart-is-empty`.
    #[error("Bad input: {0}")]
    BadInput(String),

    /// Internal failure.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Persisting the checkout failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    /// Create a bad-input error with a stable machine-readable code.
    #[must_use]
    pub fn bad_input(code: impl Into<String>) -> Self {
        Self::BadInput(code.into())
    }

    /// Classify the error into the public taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::Internal(_) | Self::Backend(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Log the error and, for internal failures, capture it to Sentry.
    ///
    /// Returns `self` so call sites can write `Err(err.report())`.
    #[must_use]
    pub fn report(self) -> Self {
        match self.kind() {
            ErrorKind::BadInput => {
                tracing::debug!(error = %self, "Rejected checkout input");
            }
            ErrorKind::Internal => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Checkout error"
                );
            }
        }
        self
    }
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Add a breadcrumb for cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// mutations leading up to a failed payment.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "prod_1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb
                .data
                .insert((*key).to_string(), (*value).to_string().into());
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            CheckoutError::bad_input("cart-is-empty").kind(),
            ErrorKind::BadInput
        );
        assert_eq!(
            CheckoutError::Internal("boom".to_string()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            CheckoutError::Backend(BackendError::Status {
                status: 502,
                body: String::new()
            })
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_display_keeps_code() {
        let err = CheckoutError::bad_input("cart-is-empty");
        assert_eq!(err.to_string(), "Bad input: cart-is-empty");
    }

    #[test]
    fn test_report_returns_same_error() {
        let err = CheckoutError::bad_input("cart-is-empty").report();
        assert!(matches!(err, CheckoutError::BadInput(code) if code == "cart-is-empty"));
    }
}
