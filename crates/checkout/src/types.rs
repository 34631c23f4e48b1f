//! Domain types for the cart and the public-commerce API.
//!
//! Persisted types ([`Checkout`], [`CartLineItem`], [`GooglePayConfig`]) keep
//! the JSON field names the embeddable cart has always written, so an
//! existing stored checkout keeps loading. New fields must stay optional.

use std::collections::BTreeMap;

use bitsnap_core::{CountryCode, DeliveryMethodId, LineItemId, MinorUnits, ProductId};
use serde::{Deserialize, Serialize};

/// Free-form string metadata attached to a line item.
pub type Metadata = BTreeMap<String, String>;

// =============================================================================
// Persisted Cart Types
// =============================================================================

/// One entry in the cart.
///
/// Identity is the local `id`; the same product may appear several times
/// with different metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Locally generated identifier.
    pub id: LineItemId,
    /// Product or variant identifier.
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    /// Quantity, at least 1 once persisted.
    pub quantity: u32,
    /// Optional metadata (e.g. gift wrapping).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// A product to put into the cart; the store assigns the local id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    /// Product or variant identifier.
    pub product_id: ProductId,
    /// Requested quantity.
    pub quantity: u32,
    /// Optional metadata.
    pub metadata: Option<Metadata>,
}

impl NewLineItem {
    /// A single unit of a product without metadata.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            metadata: None,
        }
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Google Pay gateway configuration, cached in the checkout once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayConfig {
    /// Whether Google Pay is enabled for the project.
    pub is_available: bool,
    /// Google merchant id.
    pub merchant_id: String,
    /// Merchant display name.
    pub merchant_name: String,
    /// Payment gateway name.
    pub gateway: String,
    /// Merchant id at the gateway.
    pub gateway_id: String,
}

impl GooglePayConfig {
    /// Marker stored when the backend reports Google Pay as disabled.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// The persisted checkout aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    /// Selected country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryCode>,
    /// Coupon code entered by the buyer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Selected delivery method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_delivery_method: Option<DeliveryMethodId>,
    /// Postal code, used to price delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Contact email as reported by the buyer or a payment sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Line items.
    #[serde(default)]
    pub products: Vec<CartLineItem>,
    /// Cached Google Pay configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_pay_config: Option<GooglePayConfig>,
}

impl Checkout {
    /// An empty checkout that keeps only this checkout's country.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            country: self.country.clone(),
            ..Self::default()
        }
    }

    /// Sum of quantities across line items.
    #[must_use]
    pub fn number_of_items(&self) -> u64 {
        self.products.iter().map(|p| u64::from(p.quantity)).sum()
    }

    /// Distinct product ids in first-seen order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = Vec::with_capacity(self.products.len());
        for item in &self.products {
            if !ids.contains(&item.product_id) {
                ids.push(item.product_id.clone());
            }
        }
        ids
    }

    /// Whether there is nothing to buy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Product Types
// =============================================================================

/// Subscription billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

/// Recurring billing settings of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurring {
    /// How often the buyer is charged.
    pub billing_period: BillingPeriod,
    /// Free trial length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_days: Option<u32>,
    /// Number of scheduled charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_schedule: Option<u32>,
}

/// Extra product settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdditional {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub is_ticket: Option<bool>,
    #[serde(default)]
    pub show_product_in_public_list: Option<bool>,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: ProductId,
    pub name: String,
    /// Price in minor units.
    pub price: MinorUnits,
    pub currency: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub available_quantity: Option<i64>,
    #[serde(default)]
    pub is_deliverable: Option<bool>,
}

/// Product details as returned by the public-commerce API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub id: ProductId,
    #[serde(rename = "ownerID", default)]
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor units.
    pub price: MinorUnits,
    pub currency: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(rename = "image_url", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub available_quantity: Option<i64>,
    #[serde(default)]
    pub is_deliverable: Option<bool>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub variants: Option<Vec<ProductVariant>>,
    #[serde(default)]
    pub additional: Option<ProductAdditional>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub recurring: Option<Recurring>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub deleted_at: Option<i64>,
}

impl ProductDetails {
    /// Whether the product ships physically.
    #[must_use]
    pub fn deliverable(&self) -> bool {
        self.is_deliverable == Some(true)
    }

    /// Find a variant by id.
    #[must_use]
    pub fn variant(&self, id: &ProductId) -> Option<&ProductVariant> {
        self.variants.as_deref()?.iter().find(|v| &v.id == id)
    }
}

/// A cart line item enriched with live product details. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub metadata: Option<Metadata>,
    pub details: ProductDetails,
}

impl ResolvedProduct {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> MinorUnits {
        self.details.price.times(self.quantity)
    }
}

/// A country a buyer can ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
}

// =============================================================================
// Quote Types
// =============================================================================

/// A delivery option priced by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMethod {
    pub id: DeliveryMethodId,
    pub name: String,
    /// Price in minor units.
    pub amount: MinorUnits,
    pub description: Option<String>,
    pub min_days: Option<u32>,
    pub max_days: Option<u32>,
}

/// Authoritative price breakdown for the current cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreOrderQuote {
    /// What the buyer will be charged, in minor units.
    pub total_amount: MinorUnits,
    pub currency: String,
    pub country: String,
    pub methods: Vec<DeliveryMethod>,
    pub selected_delivery_method: Option<DeliveryMethodId>,
    pub coupon_code: Option<String>,
    /// Discount in minor units, positive.
    pub coupon_value: Option<MinorUnits>,
}

impl PreOrderQuote {
    /// The method the backend marked as selected, if it is still offered.
    #[must_use]
    pub fn selected_method(&self) -> Option<&DeliveryMethod> {
        let selected = self.selected_delivery_method.as_ref()?;
        self.methods.iter().find(|m| &m.id == selected)
    }

    /// The selected method, falling back to the first offered one.
    #[must_use]
    pub fn selected_or_first_method(&self) -> Option<&DeliveryMethod> {
        match &self.selected_delivery_method {
            Some(selected) => self.methods.iter().find(|m| &m.id == selected),
            None => self.methods.first(),
        }
    }

    /// The applied coupon and its value, when both are present.
    #[must_use]
    pub fn coupon(&self) -> Option<(&str, MinorUnits)> {
        Some((self.coupon_code.as_deref()?, self.coupon_value?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn line(id: &str, product: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: LineItemId::new(id),
            product_id: ProductId::new(product),
            quantity,
            metadata: None,
        }
    }

    #[test]
    fn test_checkout_json_field_names() {
        let checkout = Checkout {
            country: Some(CountryCode::parse("PL").unwrap()),
            coupon_code: Some("X10".to_string()),
            products: vec![line("abc", "prod_1", 2)],
            ..Checkout::default()
        };
        let json = serde_json::to_value(&checkout).unwrap();
        assert_eq!(json["country"], "PL");
        assert_eq!(json["couponCode"], "X10");
        assert_eq!(json["products"][0]["productID"], "prod_1");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_cleared_keeps_only_country() {
        let checkout = Checkout {
            country: Some(CountryCode::parse("DE").unwrap()),
            coupon_code: Some("X10".to_string()),
            postal_code: Some("00-001".to_string()),
            products: vec![line("a", "p", 1)],
            google_pay_config: Some(GooglePayConfig::unavailable()),
            ..Checkout::default()
        };
        let cleared = checkout.cleared();
        assert_eq!(cleared.country, checkout.country);
        assert_eq!(cleared.coupon_code, None);
        assert!(cleared.products.is_empty());
        assert_eq!(cleared.google_pay_config, None);
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let checkout = Checkout {
            products: vec![line("a", "p1", 1), line("b", "p2", 3), line("c", "p1", 1)],
            ..Checkout::default()
        };
        assert_eq!(checkout.product_ids(), vec![ProductId::new("p1"), ProductId::new("p2")]);
        assert_eq!(checkout.number_of_items(), 5);
    }

    #[test]
    fn test_product_details_deserialize() {
        let json = r#"{
            "id": "p1",
            "ownerID": "o1",
            "name": "Koszulka",
            "description": null,
            "price": 4999,
            "currency": "PLN",
            "metadata": null,
            "image_url": "https://cdn.example/p1.png",
            "isDeliverable": true,
            "variants": [{"id": "v1", "name": "XL", "price": 5499, "currency": "PLN"}],
            "recurring": {"billingPeriod": "semi-annually", "trialDays": 7}
        }"#;
        let product: ProductDetails = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, MinorUnits::new(4999));
        assert!(product.deliverable());
        assert_eq!(
            product.variant(&ProductId::new("v1")).unwrap().price,
            MinorUnits::new(5499)
        );
        assert_eq!(
            product.recurring.unwrap().billing_period,
            BillingPeriod::SemiAnnually
        );
    }

    #[test]
    fn test_selected_or_first_method() {
        let method = |id: &str| DeliveryMethod {
            id: DeliveryMethodId::new(id),
            name: id.to_uppercase(),
            amount: MinorUnits::new(1000),
            description: None,
            min_days: None,
            max_days: None,
        };
        let mut quote = PreOrderQuote {
            total_amount: MinorUnits::new(5000),
            currency: "PLN".to_string(),
            country: "PL".to_string(),
            methods: vec![method("inpost"), method("dpd")],
            selected_delivery_method: None,
            coupon_code: None,
            coupon_value: None,
        };
        assert_eq!(quote.selected_or_first_method().unwrap().id.as_str(), "inpost");
        assert!(quote.selected_method().is_none());

        quote.selected_delivery_method = Some(DeliveryMethodId::new("dpd"));
        assert_eq!(quote.selected_or_first_method().unwrap().id.as_str(), "dpd");

        quote.selected_delivery_method = Some(DeliveryMethodId::new("gone"));
        assert!(quote.selected_or_first_method().is_none());
    }
}
