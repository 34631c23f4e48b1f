//! Cart panel.
//!
//! [`CartShell`] is what a storefront renders as the cart drawer: it reads
//! and mutates the persisted checkout and turns it into a hosted payment
//! link. Amounts shown here are display-only; what the buyer pays comes
//! from the hosted page or a quote.

use std::collections::BTreeMap;

use bitsnap_core::{CountryCode, DEFAULT_CURRENCY, Email, LineItemId, MinorUnits, ProductId, format_currency};
use tracing::{info, instrument};

use crate::context::CheckoutContext;
use crate::error::{CheckoutError, add_breadcrumb};
use crate::link::{CheckoutAgreement, LinkAddress, LinkDetails, LinkItem, LinkRequest};
use crate::types::{Country, Metadata, NewLineItem, ResolvedProduct};

/// Country sent with a direct purchase when none is given.
pub const DIRECT_PURCHASE_COUNTRY: &str = "pl";

/// Display-only cart total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtotal {
    pub amount: MinorUnits,
    pub currency: String,
}

impl std::fmt::Display for Subtotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_currency(self.amount, &self.currency))
    }
}

/// A one-product purchase that skips the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectPurchase {
    pub product_id: ProductId,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Shipping country; defaults to [`DIRECT_PURCHASE_COUNTRY`].
    pub country: Option<String>,
    /// Record marketing consent on the hosted page.
    pub marketing_agreement: bool,
}

/// The cart drawer.
#[derive(Debug)]
pub struct CartShell {
    context: CheckoutContext,
    visible: bool,
}

impl CartShell {
    /// A hidden cart over `context`.
    #[must_use]
    pub const fn new(context: CheckoutContext) -> Self {
        Self {
            context,
            visible: false,
        }
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub const fn show(&mut self) {
        self.visible = true;
    }

    pub const fn hide(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("invalid-quantity")` for quantity 0, or a storage error.
    pub fn add_product(
        &self,
        product_id: impl Into<ProductId>,
        quantity: u32,
        metadata: Option<Metadata>,
    ) -> Result<LineItemId, CheckoutError> {
        let product_id = product_id.into();
        if quantity == 0 {
            return Err(CheckoutError::bad_input("invalid-quantity"));
        }

        let item = NewLineItem {
            product_id: product_id.clone(),
            quantity,
            metadata,
        };
        let ids = self.context.store().add_products(vec![item])?;
        let id = ids
            .into_iter()
            .next()
            .ok_or_else(|| CheckoutError::Internal("line item was not added".to_string()))?;

        add_breadcrumb(
            "cart",
            "Added product",
            Some(&[("product_id", product_id.as_str()), ("line_id", id.as_str())]),
        );
        Ok(id)
    }

    /// Cart contents with live product details.
    pub async fn products(&self) -> Vec<ResolvedProduct> {
        self.context.resolve_products().await
    }

    /// Set a line item's quantity; zero or less removes it.
    ///
    /// Returns `false` if the line item does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout cannot be saved.
    pub fn update_quantity(&self, id: &LineItemId, quantity: i64) -> Result<bool, CheckoutError> {
        let quantity_str = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[("line_id", id.as_str()), ("quantity", &quantity_str)]),
        );
        Ok(self.context.store().update_quantity(id, quantity)?)
    }

    /// Remove entries by line item id or product id.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout cannot be saved.
    pub fn remove_product(&self, id: &str) -> Result<usize, CheckoutError> {
        add_breadcrumb("cart", "Removed product", Some(&[("id", id)]));
        Ok(self.context.store().remove_products(&[id])?)
    }

    /// Empty the cart, keeping the country.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout cannot be saved.
    pub fn clear(&self) -> Result<(), CheckoutError> {
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(self.context.store().clear()?)
    }

    #[must_use]
    pub fn number_of_items(&self) -> u64 {
        self.context.store().number_of_items()
    }

    /// Sum of resolved line totals, in the first product's currency.
    pub async fn subtotal(&self) -> Subtotal {
        let products = self.products().await;
        Subtotal {
            amount: products.iter().map(ResolvedProduct::line_total).sum(),
            currency: products
                .first()
                .map(|p| p.details.currency.clone())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        }
    }

    /// Whether any resolved product ships physically.
    pub async fn requires_shipping(&self) -> bool {
        self.products().await.iter().any(|p| p.details.deliverable())
    }

    // =========================================================================
    // Country
    // =========================================================================

    /// Select the shipping country.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("invalid-country")` for a malformed code.
    pub fn set_country(&self, code: &str) -> Result<(), CheckoutError> {
        let country = CountryCode::parse(code).map_err(|_| CheckoutError::bad_input("invalid-country"))?;
        Ok(self.context.store().set_country(Some(country))?)
    }

    /// The selected country, persisting the default when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the default fails.
    pub fn country(&self) -> Result<CountryCode, CheckoutError> {
        Ok(self.context.store().country_or_default()?)
    }

    /// Countries the project ships to; empty if they cannot be fetched.
    pub async fn available_countries(&self) -> Vec<Country> {
        self.context.available_countries().await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Send the cart to the hosted payment page.
    ///
    /// The cart is cleared once the link exists.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("cart-is-empty")` for an empty cart, or the error
    /// from creating the link.
    #[instrument(skip(self), fields(project_id = %self.context.config().project_id))]
    pub async fn redirect_to_next_step(&self) -> Result<String, CheckoutError> {
        let store = self.context.store();
        let checkout = store.get();
        if checkout.is_empty() {
            return Err(CheckoutError::bad_input("cart-is-empty").report());
        }

        let mut metadata = BTreeMap::new();
        for item in &checkout.products {
            if let Some(item_metadata) = &item.metadata {
                metadata.extend(item_metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        let link = LinkRequest {
            items: checkout
                .products
                .iter()
                .map(|item| LinkItem::new(item.product_id.clone(), item.quantity))
                .collect(),
            ask_for_note: Some(true),
            countries: checkout.country.as_ref().map(|c| vec![c.to_string()]),
            metadata: Some(metadata),
            ..LinkRequest::default()
        };

        let payment = self.context.create_payment_url(link).await?;
        store.clear()?;
        info!("Redirecting to the hosted payment page");
        Ok(payment.url)
    }

    /// Buy a single product straight away.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("invalid-email")` for a malformed email, or the
    /// error from creating the link.
    #[instrument(skip(self, purchase), fields(project_id = %self.context.config().project_id, product_id = %purchase.product_id))]
    pub async fn just_redirect_to_payment(&self, purchase: DirectPurchase) -> Result<String, CheckoutError> {
        let email = Email::parse_optional(purchase.email.as_deref())
            .map_err(|_| CheckoutError::bad_input("invalid-email"))?;
        let country = purchase
            .country
            .unwrap_or_else(|| DIRECT_PURCHASE_COUNTRY.to_string());

        let link = LinkRequest {
            items: vec![LinkItem::new(purchase.product_id, 1)],
            ask_for_note: Some(false),
            details: Some(LinkDetails {
                email,
                name: purchase.name,
                address: Some(LinkAddress {
                    country: Some(country),
                    ..LinkAddress::default()
                }),
                ..LinkDetails::default()
            }),
            additional_agreements: purchase
                .marketing_agreement
                .then(|| vec![CheckoutAgreement::marketing_accepted()]),
            ..LinkRequest::default()
        };

        let payment = self.context.create_payment_url(link).await?;
        Ok(payment.url)
    }
}
