//! One-click payment sheet adapters (Apple Pay, Google Pay).
//!
//! Each adapter is an explicit state machine: the host forwards native sheet
//! callbacks as typed events to `handle` and performs the returned command.
//! Every amount shown on a sheet comes from a backend quote; the mapping
//! functions only format.

pub mod apple_pay;
pub mod google_pay;

use std::time::Duration;

use bitsnap_core::{MinorUnits, ProductId};

use crate::pricing::QuoteRequest;
use crate::types::{Metadata, NewLineItem, ResolvedProduct};

pub use apple_pay::ApplePaySession;
pub use google_pay::GooglePayAdapter;

/// Label of the grand total on both sheets.
pub const TOTAL_LABEL: &str = "Płatność za koszyk";

/// Wallet the payment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletGateway {
    ApplePay,
    GooglePay,
}

/// Final status reported back to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failure,
}

/// Navigation the host should perform once `after` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRedirect {
    pub url: String,
    pub after: Duration,
}

/// A product rendered on a payment button.
///
/// Price and deliverability only seed the provisional Apple Pay total shown
/// before the first quote arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor units.
    pub price: MinorUnits,
    pub quantity: u32,
    pub is_deliverable: bool,
    pub metadata: Option<Metadata>,
}

impl ButtonItem {
    /// The cart entry this button item seeds.
    #[must_use]
    pub fn to_line_item(&self) -> NewLineItem {
        NewLineItem {
            product_id: self.id.clone(),
            quantity: self.quantity,
            metadata: self.metadata.clone(),
        }
    }
}

impl From<&ResolvedProduct> for ButtonItem {
    fn from(product: &ResolvedProduct) -> Self {
        Self {
            id: product.product_id.clone(),
            name: product.details.name.clone(),
            price: product.details.price,
            quantity: product.quantity,
            is_deliverable: product.details.deliverable(),
            metadata: product.metadata.clone(),
        }
    }
}

/// A postal address attached to an authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub name: String,
    pub line1: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

/// Everything the backend needs to charge a wallet payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneClickAuthorization {
    pub gateway: WalletGateway,
    /// Opaque token payload from the wallet.
    pub payment_data: String,
    /// Wallet payment method description.
    pub payment_method: String,
    /// Empty for Google Pay.
    pub transaction_identifier: String,
    /// Order composition, priced again by the backend.
    pub order: QuoteRequest,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    /// JSON metadata, e.g. `{"ref":"partner-7"}`.
    pub metadata: Option<String>,
}

/// Metadata JSON carrying the referral reference, if any.
#[must_use]
pub fn reference_metadata(reference: Option<String>) -> Option<String> {
    reference.map(|r| serde_json::json!({ "ref": r }).to_string())
}

/// Join name parts with single spaces, skipping blanks.
#[must_use]
pub fn join_name(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_present(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .map(|v| (*v).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_metadata() {
        assert_eq!(
            reference_metadata(Some("partner-7".to_string())).as_deref(),
            Some(r#"{"ref":"partner-7"}"#)
        );
        assert_eq!(reference_metadata(None), None);
    }

    #[test]
    fn test_join_name() {
        assert_eq!(join_name(&[Some("Jan"), Some("Kowalski")]), "Jan Kowalski");
        assert_eq!(join_name(&[None, Some("Kowalski")]), "Kowalski");
        assert_eq!(join_name(&[Some(" "), None]), "");
    }

    #[test]
    fn test_first_present() {
        assert_eq!(
            first_present(&[None, Some(""), Some("b@example.pl")]).as_deref(),
            Some("b@example.pl")
        );
        assert_eq!(first_present(&[None]), None);
    }
}
