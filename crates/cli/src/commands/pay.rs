//! Quote, checkout and wallet commands.
//!
//! # Usage
//!
//! ```bash
//! bitsnap quote
//! bitsnap checkout
//! bitsnap buy prod_1 --email jan@example.com --marketing
//! bitsnap link prod_1:2 prod_2 --automatic
//! bitsnap wallets
//! ```

use bitsnap_checkout::link::{LinkItem, LinkRequest};
use bitsnap_checkout::wallet::google_pay::GooglePayAvailability;
use bitsnap_checkout::{CheckoutContext, CheckoutError, DirectPurchase};
use bitsnap_core::format_currency;

/// Quote the stored cart and print the breakdown.
#[allow(clippy::print_stdout)]
pub async fn quote(ctx: &CheckoutContext) -> Result<(), CheckoutError> {
    let settlement = ctx.quote().await?;
    let quote = &settlement.quote;

    for method in &quote.methods {
        let marker = if quote.selected_delivery_method.as_ref() == Some(&method.id) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<16} {:<24} {}",
            method.id,
            method.name,
            format_currency(method.amount, &quote.currency)
        );
    }
    if let Some((code, value)) = quote.coupon() {
        println!("  coupon {code}: -{}", format_currency(value, &quote.currency));
    }
    println!("Total: {}", format_currency(quote.total_amount, &quote.currency));
    Ok(())
}

/// Turn the cart into a hosted payment link.
#[allow(clippy::print_stdout)]
pub async fn checkout(ctx: &CheckoutContext) -> Result<(), CheckoutError> {
    let url = ctx.cart().redirect_to_next_step().await?;
    println!("{url}");
    Ok(())
}

/// Buy one product without touching the cart.
#[allow(clippy::print_stdout)]
pub async fn buy(ctx: &CheckoutContext, purchase: DirectPurchase) -> Result<(), CheckoutError> {
    let url = ctx.cart().just_redirect_to_payment(purchase).await?;
    println!("{url}");
    Ok(())
}

/// Create a payment link for explicit items.
///
/// `automatic` goes through the API-key endpoint, honoring test mode.
#[allow(clippy::print_stdout)]
pub async fn link(
    ctx: &CheckoutContext,
    items: Vec<(String, u32)>,
    automatic: bool,
) -> Result<(), CheckoutError> {
    let request = LinkRequest {
        items: items
            .into_iter()
            .map(|(id, quantity)| LinkItem::new(id, quantity))
            .collect(),
        ..LinkRequest::default()
    };

    let url = if automatic {
        let config = ctx.config();
        ctx.create_checkout(request, config.api_key.as_ref(), config.test_mode)
            .await?
            .redirect_url
    } else {
        ctx.create_payment_url(request).await?.url
    };
    println!("{url}");
    Ok(())
}

/// Report which payment sheets the project offers for the stored cart.
#[allow(clippy::print_stdout)]
pub async fn wallets(ctx: &CheckoutContext, show_request: bool) -> Result<(), serde_json::Error> {
    let mut apple_pay = ctx.apple_pay(Vec::new());
    let apple_available = apple_pay.mount(true).await;
    println!(
        "Apple Pay:  {}",
        if apple_available { "available" } else { "unavailable" }
    );

    let mut google_pay = ctx.google_pay(Vec::new());
    match google_pay.mount().await {
        GooglePayAvailability::Available(request) => {
            println!("Google Pay: available");
            if show_request {
                println!("{}", serde_json::to_string_pretty(&request)?);
            }
        }
        GooglePayAvailability::Unavailable => println!("Google Pay: unavailable"),
    }
    Ok(())
}
