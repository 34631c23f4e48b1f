//! Product resolution.
//!
//! Cart line items only carry product ids; names, prices and deliverability
//! are fetched on every read so a price change on the backend is never
//! hidden by the cart. A line item may point at a variant id directly, in
//! which case the variant's fields are laid over its parent product.

use bitsnap_core::ProductId;
use tracing::{instrument, warn};

use crate::backend::Backend;
use crate::types::{Checkout, ProductDetails, ProductVariant, ResolvedProduct};

/// Resolve every line item of `checkout` against live product data.
///
/// Line items that match no product are dropped. A failed lookup degrades
/// to an empty list.
#[instrument(skip_all, fields(line_items = checkout.products.len()))]
pub async fn resolve_products(backend: &dyn Backend, checkout: &Checkout) -> Vec<ResolvedProduct> {
    let ids = checkout.product_ids();
    if ids.is_empty() {
        return Vec::new();
    }

    let products = match backend.products(&ids).await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Product lookup failed, showing an empty cart");
            return Vec::new();
        }
    };

    checkout
        .products
        .iter()
        .filter_map(|item| {
            let Some(product) = find_product(&products, &item.product_id) else {
                warn!(product_id = %item.product_id, "Dropping line item for unknown product");
                return None;
            };
            Some(ResolvedProduct {
                id: item.id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                metadata: item.metadata.clone(),
                details: resolve_details(&item.product_id, product),
            })
        })
        .collect()
}

/// First product that is, or has a variant with, the given id.
#[must_use]
pub fn find_product<'a>(products: &'a [ProductDetails], id: &ProductId) -> Option<&'a ProductDetails> {
    products
        .iter()
        .find(|product| &product.id == id || product.variant(id).is_some())
}

/// Effective details for `id` within `product`.
#[must_use]
pub fn resolve_details(id: &ProductId, product: &ProductDetails) -> ProductDetails {
    let Some(variant) = product.variant(id) else {
        return product.clone();
    };

    let mut details = overlay_variant(product, variant);
    // A variant sharing the parent's id keeps the parent id
    if id == &product.id {
        details.id = product.id.clone();
    }
    details
}

fn overlay_variant(product: &ProductDetails, variant: &ProductVariant) -> ProductDetails {
    ProductDetails {
        id: variant.id.clone(),
        name: format!("{} {}", product.name, variant.name),
        price: variant.price,
        currency: variant.currency.clone(),
        available_quantity: variant.available_quantity.or(product.available_quantity),
        is_deliverable: variant.is_deliverable.or(product.is_deliverable),
        images: variant.images.clone().or_else(|| product.images.clone()),
        ..product.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bitsnap_core::{LineItemId, MinorUnits};
    use serde_json::json;

    use super::*;
    use crate::testing::FakeBackend;
    use crate::types::CartLineItem;

    fn product(value: serde_json::Value) -> ProductDetails {
        serde_json::from_value(value).unwrap()
    }

    fn parent() -> ProductDetails {
        product(json!({
            "id": "p1",
            "name": "Koszulka",
            "price": 4000,
            "currency": "PLN",
            "images": ["parent.png"],
            "availableQuantity": 10,
            "isDeliverable": true,
            "variants": [
                {"id": "v1", "name": "XL", "price": 500, "currency": "EUR", "isDeliverable": false},
                {"id": "p1", "name": "Base", "price": 4100, "currency": "PLN", "images": ["base.png"]}
            ]
        }))
    }

    fn checkout(product_ids: &[&str]) -> Checkout {
        Checkout {
            products: product_ids
                .iter()
                .enumerate()
                .map(|(i, id)| CartLineItem {
                    id: LineItemId::new(format!("line{i}")),
                    product_id: ProductId::new(*id),
                    quantity: 1,
                    metadata: None,
                })
                .collect(),
            ..Checkout::default()
        }
    }

    #[test]
    fn test_variant_overlay() {
        let details = resolve_details(&ProductId::new("v1"), &parent());
        assert_eq!(details.id.as_str(), "v1");
        assert_eq!(details.name, "Koszulka XL");
        assert_eq!(details.price, MinorUnits::new(500));
        assert_eq!(details.currency, "EUR");
        assert_eq!(details.is_deliverable, Some(false));
        // Falls back to the parent where the variant is silent
        assert_eq!(details.available_quantity, Some(10));
        assert_eq!(details.images, Some(vec!["parent.png".to_string()]));
    }

    #[test]
    fn test_variant_with_parent_id_keeps_parent_id() {
        let details = resolve_details(&ProductId::new("p1"), &parent());
        assert_eq!(details.id.as_str(), "p1");
        assert_eq!(details.name, "Koszulka Base");
        assert_eq!(details.price, MinorUnits::new(4100));
        assert_eq!(details.images, Some(vec!["base.png".to_string()]));
    }

    #[test]
    fn test_plain_product_unchanged() {
        let plain = product(json!({"id": "a", "name": "Mug", "price": 1000, "currency": "PLN"}));
        assert_eq!(resolve_details(&ProductId::new("a"), &plain), plain);
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_products() {
        let backend = FakeBackend::new().with_products(vec![product(
            json!({"id": "a", "name": "Mug", "price": 1000, "currency": "PLN"}),
        )]);

        let resolved = resolve_products(&backend, &checkout(&["a", "missing"])).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].product_id.as_str(), "a");
        assert_eq!(backend.product_requests(), vec![vec![
            ProductId::new("a"),
            ProductId::new("missing")
        ]]);
    }

    #[tokio::test]
    async fn test_resolve_variant_line_item() {
        let backend = FakeBackend::new().with_products(vec![parent()]);
        let resolved = resolve_products(&backend, &checkout(&["v1"])).await;
        assert_eq!(resolved[0].details.price, MinorUnits::new(500));
        assert_eq!(resolved[0].details.name, "Koszulka XL");
    }

    #[tokio::test]
    async fn test_resolve_empty_cart_skips_fetch() {
        let backend = FakeBackend::new();
        assert!(resolve_products(&backend, &Checkout::default()).await.is_empty());
        assert!(backend.product_requests().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_degrades_on_failure() {
        let backend = FakeBackend::new().failing_products();
        assert!(resolve_products(&backend, &checkout(&["a"])).await.is_empty());
    }
}
