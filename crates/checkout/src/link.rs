//! Hosted payment links.
//!
//! A [`LinkRequest`] describes a checkout session on the hosted payment page:
//! what is bought, what the page should ask for and where to go afterwards.

use std::collections::BTreeMap;

use bitsnap_core::{Email, MinorUnits, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::types::Recurring;

/// Agreement id the hosted page records as marketing consent.
pub const MARKETING_AGREEMENT_ID: &str = "__m_a";

/// Metadata key carrying the referral reference.
pub const REFERENCE_METADATA_KEY: &str = "ref";

/// A delivery option offered on the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDelivery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Minimum delivery time in days.
    pub min: u32,
    /// Maximum delivery time in days.
    pub max: u32,
    /// Price in minor units.
    pub price: MinorUnits,
}

impl LinkDelivery {
    /// Build an option from a price in major units, rounding half-up.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("invalid-delivery-price")` if the price is negative
    /// or out of range.
    pub fn from_major(name: impl Into<String>, min: u32, max: u32, price: Decimal) -> Result<Self, CheckoutError> {
        let price = MinorUnits::from_major(price)
            .filter(|p| p.amount() >= 0)
            .ok_or_else(|| CheckoutError::bad_input("invalid-delivery-price"))?;
        Ok(Self {
            name: name.into(),
            desc: None,
            min,
            max,
            price,
        })
    }
}

/// Shipping address prefilled on the hosted page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Invoice address prefilled on the hosted page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBillingAddress {
    /// Polish tax id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// Buyer details prefilled on the hosted page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<LinkAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<LinkBillingAddress>,
}

/// A product on the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<MinorUnits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurring>,
}

impl LinkItem {
    /// A catalogue product by id.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            name: None,
            description: None,
            image_url: None,
            price: None,
            currency: None,
            recurring: None,
        }
    }
}

/// An extra consent checkbox on the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAgreement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<bool>,
}

impl CheckoutAgreement {
    /// Marketing consent the buyer already gave.
    #[must_use]
    pub fn marketing_accepted() -> Self {
        Self {
            id: Some(MARKETING_AGREEMENT_ID.to_string()),
            name: String::new(),
            description: None,
            required: true,
            answer: Some(true),
        }
    }
}

/// Where the hosted page sends the buyer afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRedirect {
    #[serde(rename = "successURL", default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(rename = "cancelURL", default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// Request for a hosted payment link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_address: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_phone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_note: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_nip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Vec<LinkDelivery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<LinkDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    pub items: Vec<LinkItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_agreements: Option<Vec<CheckoutAgreement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blik_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<LinkRedirect>,
}

impl LinkRequest {
    /// Check the request before sending it.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("items-empty")` without items and
    /// `BadInput("invalid-quantity")` when any quantity is below 1.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::bad_input("items-empty"));
        }
        if self.items.iter().any(|item| item.quantity < 1) {
            return Err(CheckoutError::bad_input("invalid-quantity"));
        }
        Ok(())
    }

    /// Add the referral reference to the metadata, if there is one.
    pub fn inject_reference(&mut self, reference: Option<String>) {
        if let Some(reference) = reference {
            self.metadata
                .get_or_insert_with(BTreeMap::new)
                .insert(REFERENCE_METADATA_KEY.to_string(), reference);
        }
    }
}

/// Outcome of the automatic checkout endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirect {
    /// Always `"ok"` when returned.
    pub status: &'static str,
    pub redirect_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_wire_names() {
        let mut request = LinkRequest {
            ask_for_note: Some(true),
            items: vec![LinkItem {
                image_url: Some("https://cdn.example/a.png".to_string()),
                ..LinkItem::new("p1", 2)
            }],
            redirect: Some(LinkRedirect {
                success_url: Some("https://shop.example/ok".to_string()),
                cancel_url: None,
            }),
            ..LinkRequest::default()
        };
        request.inject_reference(Some("partner-7".to_string()));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["askForNote"], true);
        assert_eq!(json["items"][0]["imageURL"], "https://cdn.example/a.png");
        assert_eq!(json["redirect"]["successURL"], "https://shop.example/ok");
        assert_eq!(json["metadata"]["ref"], "partner-7");
        assert!(json.get("countries").is_none());
    }

    #[test]
    fn test_delivery_price_in_minor_units() {
        let delivery = LinkDelivery::from_major("Kurier", 1, 3, Decimal::new(16_995, 3)).unwrap();
        assert_eq!(delivery.price, MinorUnits::new(1700));
        assert_eq!(serde_json::to_value(&delivery).unwrap()["price"], 1700);

        assert!(LinkDelivery::from_major("Kurier", 1, 3, Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_validate() {
        let empty = LinkRequest::default();
        assert!(matches!(empty.validate(), Err(CheckoutError::BadInput(code)) if code == "items-empty"));

        let zero = LinkRequest {
            items: vec![LinkItem::new("p1", 0)],
            ..LinkRequest::default()
        };
        assert!(matches!(zero.validate(), Err(CheckoutError::BadInput(code)) if code == "invalid-quantity"));

        let ok = LinkRequest {
            items: vec![LinkItem::new("p1", 1)],
            ..LinkRequest::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_inject_reference_without_reference() {
        let mut request = LinkRequest::default();
        request.inject_reference(None);
        assert_eq!(request.metadata, None);
    }

    #[test]
    fn test_details_email_is_validated_on_read() {
        let result: Result<LinkDetails, _> = serde_json::from_str(r#"{"email": "broken"}"#);
        assert!(result.is_err());
    }
}
