//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! bitsnap cart add prod_1 -q 2 --meta gift=yes
//! bitsnap cart list
//! bitsnap cart update k3j9x 5
//! bitsnap cart remove k3j9x
//! bitsnap cart country DE
//! ```

use bitsnap_checkout::{CartShell, CheckoutError};
use bitsnap_checkout::types::Metadata;
use bitsnap_core::{LineItemId, format_currency};

/// Add a product and print the new line item id.
#[allow(clippy::print_stdout)]
pub fn add(
    cart: &CartShell,
    product: &str,
    quantity: u32,
    meta: Vec<(String, String)>,
) -> Result<(), CheckoutError> {
    let metadata: Option<Metadata> = (!meta.is_empty()).then(|| meta.into_iter().collect());
    let id = cart.add_product(product, quantity, metadata)?;
    tracing::info!(line_id = %id, "Added {product} x {quantity}");
    println!("{id}");
    Ok(())
}

/// Print the cart with live product details.
#[allow(clippy::print_stdout)]
pub async fn list(cart: &CartShell) {
    let products = cart.products().await;
    if products.is_empty() {
        println!("Cart is empty");
        return;
    }

    for product in &products {
        println!(
            "{:<12} {:<32} {:>3} x {:>12}  {}",
            product.id,
            product.details.name,
            product.quantity,
            format_currency(product.details.price, &product.details.currency),
            product.metadata.as_ref().map_or_else(String::new, |m| {
                m.iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",")
            }),
        );
    }

    let shipping = if cart.requires_shipping().await {
        "ships"
    } else {
        "digital"
    };
    println!(
        "{} item(s), subtotal {} ({shipping})",
        cart.number_of_items(),
        cart.subtotal().await
    );
}

/// Change a line item's quantity.
pub fn update(cart: &CartShell, line_id: &str, quantity: i64) -> Result<(), CheckoutError> {
    if !cart.update_quantity(&LineItemId::new(line_id), quantity)? {
        return Err(CheckoutError::bad_input("unknown-line-item"));
    }
    tracing::info!("Set {line_id} to {quantity}");
    Ok(())
}

/// Remove by line item or product id.
pub fn remove(cart: &CartShell, id: &str) -> Result<(), CheckoutError> {
    let removed = cart.remove_product(id)?;
    tracing::info!("Removed {removed} line item(s)");
    Ok(())
}

/// Empty the cart.
pub fn clear(cart: &CartShell) -> Result<(), CheckoutError> {
    cart.clear()?;
    tracing::info!("Cart cleared");
    Ok(())
}

/// Show the selected country, or select one.
#[allow(clippy::print_stdout)]
pub fn country(cart: &CartShell, code: Option<&str>) -> Result<(), CheckoutError> {
    if let Some(code) = code {
        cart.set_country(code)?;
    }
    println!("{}", cart.country()?);
    Ok(())
}

/// List the countries the project ships to.
#[allow(clippy::print_stdout)]
pub async fn countries(cart: &CartShell) {
    let countries = cart.available_countries().await;
    if countries.is_empty() {
        tracing::warn!("No countries available");
    }
    for country in countries {
        println!("{}  {}", country.code, country.name);
    }
}
