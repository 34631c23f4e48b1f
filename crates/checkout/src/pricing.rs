//! Pre-order pricing quotes.
//!
//! Every change that can affect the price (items, country, postal code,
//! coupon, delivery method) must be followed by a fresh quote. Overlapping
//! quotes are not cancelled: whichever response settles last is what the
//! [`QuoteBoard`] shows. Each request carries a [`QuoteEpoch`] so callers can
//! tell when a late response overwrote a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bitsnap_core::{DeliveryMethodId, ProductId};
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, BackendError};
use crate::types::{Checkout, PreOrderQuote, ResolvedProduct};

/// One priced line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteItem {
    pub id: ProductId,
    pub quantity: u32,
}

/// Inputs to a pricing quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRequest {
    pub items: Vec<QuoteItem>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub coupon_code: Option<String>,
    pub delivery_method: Option<DeliveryMethodId>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl QuoteRequest {
    /// Quote the resolved products with the checkout's selections.
    ///
    /// Line items that did not resolve are not priced.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout, products: &[ResolvedProduct]) -> Self {
        Self {
            items: products
                .iter()
                .map(|p| QuoteItem {
                    id: p.product_id.clone(),
                    quantity: p.quantity,
                })
                .collect(),
            country: checkout.country.as_ref().map(ToString::to_string),
            postal_code: checkout.postal_code.clone(),
            coupon_code: checkout.coupon_code.clone(),
            delivery_method: checkout.selected_delivery_method.clone(),
            email: None,
            phone: None,
        }
    }
}

/// Sequence number of a quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuoteEpoch(u64);

impl QuoteEpoch {
    /// Raw sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A quote that has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Epoch of the request that produced this quote.
    pub epoch: QuoteEpoch,
    pub quote: PreOrderQuote,
    /// A newer request had already settled when this one did.
    pub stale: bool,
}

#[derive(Debug, Default)]
struct BoardState {
    current: Option<Settlement>,
    newest_settled: Option<QuoteEpoch>,
}

/// The quote currently on display.
#[derive(Debug, Default)]
pub struct QuoteBoard {
    next_epoch: AtomicU64,
    state: Mutex<BoardState>,
}

impl QuoteBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the epoch for a new request.
    pub fn begin(&self) -> QuoteEpoch {
        QuoteEpoch(self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Publish a settled quote. The last settlement always wins.
    pub fn settle(&self, epoch: QuoteEpoch, quote: PreOrderQuote) -> Settlement {
        let mut state = self.state();
        let stale = state.newest_settled.is_some_and(|newest| newest > epoch);
        if stale {
            warn!(
                epoch = epoch.value(),
                "Quote settled after a newer one, overwriting it"
            );
        }

        let settlement = Settlement {
            epoch,
            quote,
            stale,
        };
        state.newest_settled = state.newest_settled.max(Some(epoch));
        state.current = Some(settlement.clone());
        settlement
    }

    /// The quote displayed right now.
    #[must_use]
    pub fn current(&self) -> Option<Settlement> {
        self.state().current.clone()
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Runs quotes against the backend and publishes them to a board.
#[derive(Clone)]
pub struct Quoter {
    backend: Arc<dyn Backend>,
    board: Arc<QuoteBoard>,
}

impl Quoter {
    /// Create a quoter with its own board.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            board: Arc::new(QuoteBoard::new()),
        }
    }

    /// The board quotes are published to.
    #[must_use]
    pub fn board(&self) -> &QuoteBoard {
        &self.board
    }

    /// Request a quote and publish it once it settles.
    ///
    /// # Errors
    ///
    /// Returns the backend error; nothing is published in that case.
    #[instrument(skip(self, request), fields(items = request.items.len(), coupon = ?request.coupon_code))]
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Settlement, BackendError> {
        let epoch = self.board.begin();
        debug!(epoch = epoch.value(), "Requesting quote");
        let quote = self.backend.pre_order_details(request).await?;
        Ok(self.board.settle(epoch, quote))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bitsnap_core::{CountryCode, LineItemId, MinorUnits};

    use super::*;
    use crate::types::ProductDetails;

    fn quote(total: i64) -> PreOrderQuote {
        PreOrderQuote {
            total_amount: MinorUnits::new(total),
            currency: "PLN".to_string(),
            country: "PL".to_string(),
            methods: Vec::new(),
            selected_delivery_method: None,
            coupon_code: None,
            coupon_value: None,
        }
    }

    #[test]
    fn test_from_checkout_uses_resolved_products() {
        let details: ProductDetails = serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "Mug", "price": 1000, "currency": "PLN"
        }))
        .unwrap();
        let checkout = Checkout {
            country: Some(CountryCode::parse("de").unwrap()),
            coupon_code: Some("X10".to_string()),
            selected_delivery_method: Some(DeliveryMethodId::new("dpd")),
            ..Checkout::default()
        };
        let products = vec![ResolvedProduct {
            id: LineItemId::new("l1"),
            product_id: ProductId::new("p1"),
            quantity: 3,
            metadata: None,
            details,
        }];

        let request = QuoteRequest::from_checkout(&checkout, &products);
        assert_eq!(
            request.items,
            vec![QuoteItem {
                id: ProductId::new("p1"),
                quantity: 3
            }]
        );
        assert_eq!(request.country.as_deref(), Some("DE"));
        assert_eq!(request.coupon_code.as_deref(), Some("X10"));
        assert_eq!(request.delivery_method.unwrap().as_str(), "dpd");
    }

    #[test]
    fn test_board_epochs_increase() {
        let board = QuoteBoard::new();
        let first = board.begin();
        let second = board.begin();
        assert!(first < second);
        assert_eq!(first.value(), 1);
    }

    #[test]
    fn test_board_in_order_settlements_are_fresh() {
        let board = QuoteBoard::new();
        let first = board.begin();
        let second = board.begin();

        assert!(!board.settle(first, quote(100)).stale);
        assert!(!board.settle(second, quote(200)).stale);
        assert_eq!(board.current().unwrap().quote.total_amount, MinorUnits::new(200));
    }

    #[test]
    fn test_board_last_settled_wins_and_is_marked_stale() {
        let board = QuoteBoard::new();
        let first = board.begin();
        let second = board.begin();

        assert!(!board.settle(second, quote(200)).stale);
        let late = board.settle(first, quote(100));
        assert!(late.stale);

        let current = board.current().unwrap();
        assert_eq!(current.epoch, first);
        assert_eq!(current.quote.total_amount, MinorUnits::new(100));
    }
}
