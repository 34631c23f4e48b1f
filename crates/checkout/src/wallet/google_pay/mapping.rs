//! Quote to Google Pay request mapping.

use bitsnap_core::{CountryCode, DEFAULT_CURRENCY, MinorUnits, format_currency};

use super::types::{
    CallbackIntent, CardParameters, DisplayItem, DisplayItemType, MerchantInfo, PaymentDataRequest,
    PaymentMethodSpec, SelectionOption, ShippingAddressParameters, ShippingOptionParameters,
    TokenizationParameters, TokenizationSpecification, TransactionInfo,
};
use crate::types::{GooglePayConfig, PreOrderQuote, ResolvedProduct};
use crate::wallet::TOTAL_LABEL;

/// Google Pay shows at most this many shipping options.
pub const MAX_SHIPPING_OPTIONS: usize = 5;

/// Shipping options for a quote, preselecting the quote's method.
#[must_use]
pub fn shipping_options(quote: &PreOrderQuote) -> ShippingOptionParameters {
    ShippingOptionParameters {
        shipping_options: quote
            .methods
            .iter()
            .take(MAX_SHIPPING_OPTIONS)
            .map(|method| SelectionOption {
                id: method.id.to_string(),
                label: format!(
                    "{} - {}",
                    method.name,
                    format_currency(method.amount, &quote.currency)
                ),
                description: method.description.clone().unwrap_or_default(),
            })
            .collect(),
        default_selected_option_id: quote
            .selected_delivery_method
            .as_ref()
            .map(ToString::to_string),
    }
}

/// Summary rows: unit-priced products, delivery, coupon, subtotal.
///
/// The discount row uses the checkout's coupon code and the quote's coupon
/// value, shown as a positive amount.
#[must_use]
pub fn display_items(
    products: &[ResolvedProduct],
    quote: &PreOrderQuote,
    coupon_code: Option<&str>,
) -> Vec<DisplayItem> {
    let mut items: Vec<DisplayItem> = products
        .iter()
        .map(|p| {
            DisplayItem::new(
                format!("{} x {}", p.details.name, p.quantity),
                p.details.price.display(),
                DisplayItemType::LineItem,
            )
        })
        .collect();

    if let Some(method) = quote.selected_or_first_method() {
        items.push(DisplayItem::new(
            method.name.clone(),
            method.amount.display(),
            DisplayItemType::ShippingOption,
        ));
    }

    if let (Some(code), Some(value)) = (coupon_code, quote.coupon_value) {
        items.push(DisplayItem::new(
            format!("Kupon {code}"),
            value.display(),
            DisplayItemType::Discount,
        ));
    }

    let subtotal: MinorUnits = products.iter().map(ResolvedProduct::line_total).sum();
    if subtotal > MinorUnits::ZERO {
        items.push(DisplayItem::new(
            "Subtotal",
            subtotal.display(),
            DisplayItemType::Subtotal,
        ));
    }

    items
}

/// The full request for a settled quote.
#[must_use]
pub fn payment_request(
    products: &[ResolvedProduct],
    quote: &PreOrderQuote,
    config: &GooglePayConfig,
    coupon_code: Option<&str>,
    country: &CountryCode,
) -> PaymentDataRequest {
    let requires_shipping = products.iter().any(|p| p.details.deliverable());
    let currency = if quote.currency.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        quote.currency.clone()
    };
    let country_code = if quote.country.is_empty() {
        country.to_string()
    } else {
        quote.country.clone()
    };

    PaymentDataRequest {
        api_version: 2,
        api_version_minor: 0,
        callback_intents: if requires_shipping {
            vec![CallbackIntent::ShippingAddress, CallbackIntent::ShippingOption]
        } else {
            Vec::new()
        },
        allowed_payment_methods: vec![PaymentMethodSpec {
            kind: "CARD".to_string(),
            parameters: CardParameters {
                allowed_auth_methods: vec!["PAN_ONLY".to_string(), "CRYPTOGRAM_3DS".to_string()],
                allowed_card_networks: vec!["MASTERCARD".to_string(), "VISA".to_string()],
            },
            tokenization_specification: TokenizationSpecification {
                kind: "PAYMENT_GATEWAY".to_string(),
                parameters: TokenizationParameters {
                    gateway: config.gateway.clone(),
                    gateway_merchant_id: config.gateway_id.clone(),
                },
            },
        }],
        email_required: true,
        shipping_address_parameters: ShippingAddressParameters {
            phone_number_required: requires_shipping,
        },
        shipping_address_required: requires_shipping,
        shipping_option_required: requires_shipping,
        shipping_option_parameters: requires_shipping.then(|| shipping_options(quote)),
        merchant_info: MerchantInfo {
            merchant_id: config.merchant_id.clone(),
            merchant_name: config.merchant_name.clone(),
        },
        transaction_info: TransactionInfo {
            total_price_status: "FINAL".to_string(),
            total_price_label: TOTAL_LABEL.to_string(),
            total_price: quote.total_amount.display(),
            currency_code: currency,
            country_code,
            checkout_option: "COMPLETE_IMMEDIATE_PURCHASE".to_string(),
            display_items: display_items(products, quote, coupon_code),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bitsnap_core::{DeliveryMethodId, LineItemId, ProductId};

    use super::*;
    use crate::testing::{delivery_method, google_pay_config, product, quote};

    fn resolved(name: &str, price: i64, quantity: u32, deliverable: bool) -> ResolvedProduct {
        ResolvedProduct {
            id: LineItemId::new("l"),
            product_id: ProductId::new(name),
            quantity,
            metadata: None,
            details: product(name, name, price, deliverable),
        }
    }

    #[test]
    fn test_shipping_options_capped_at_five() {
        let mut q = quote(0);
        q.methods = (0..7)
            .map(|i| delivery_method(&format!("m{i}"), "Kurier", 1_699))
            .collect();
        q.selected_delivery_method = Some(DeliveryMethodId::new("m2"));

        let options = shipping_options(&q);
        assert_eq!(options.shipping_options.len(), 5);
        assert_eq!(options.shipping_options[0].label, "Kurier - 16.99 PLN");
        assert_eq!(options.default_selected_option_id.as_deref(), Some("m2"));
    }

    #[test]
    fn test_display_items() {
        let mut q = quote(3_199);
        q.methods = vec![
            delivery_method("inpost", "InPost", 1_699),
            delivery_method("dpd", "DPD", 2_000),
        ];
        q.coupon_value = Some(MinorUnits::new(500));

        let items = display_items(&[resolved("Mug", 1_000, 2, true)], &q, Some("X10"));
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].label, "Mug x 2");
        assert_eq!(items[0].price, "10.00");
        // Nothing selected yet: the first method is shown
        assert_eq!(items[1].label, "InPost");
        assert_eq!(items[1].kind, DisplayItemType::ShippingOption);
        assert_eq!(items[2].label, "Kupon X10");
        assert_eq!(items[2].price, "5.00");
        assert_eq!(items[3].label, "Subtotal");
        assert_eq!(items[3].price, "20.00");
    }

    #[test]
    fn test_display_items_without_coupon_value() {
        let items = display_items(&[resolved("Mug", 1_000, 1, false)], &quote(1_000), Some("X10"));
        assert!(items.iter().all(|i| i.kind != DisplayItemType::Discount));
    }

    #[test]
    fn test_payment_request_digital_cart() {
        let request = payment_request(
            &[resolved("Ebook", 2_500, 1, false)],
            &quote(2_500),
            &google_pay_config(),
            None,
            &CountryCode::default(),
        );
        assert!(request.callback_intents.is_empty());
        assert!(!request.shipping_address_required);
        assert_eq!(request.shipping_option_parameters, None);
        assert_eq!(request.transaction_info.total_price, "25.00");
        assert_eq!(request.transaction_info.total_price_label, TOTAL_LABEL);
    }

    #[test]
    fn test_payment_request_wire_format() {
        let mut q = quote(2_699);
        q.methods = vec![delivery_method("inpost", "InPost", 1_699)];
        let request = payment_request(
            &[resolved("Mug", 1_000, 1, true)],
            &q,
            &google_pay_config(),
            None,
            &CountryCode::default(),
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["apiVersion"], 2);
        assert_eq!(json["callbackIntents"][0], "SHIPPING_ADDRESS");
        assert_eq!(json["callbackIntents"][1], "SHIPPING_OPTION");
        let method = &json["allowedPaymentMethods"][0];
        assert_eq!(method["type"], "CARD");
        assert_eq!(method["parameters"]["allowedAuthMethods"][1], "CRYPTOGRAM_3DS");
        assert_eq!(method["tokenizationSpecification"]["type"], "PAYMENT_GATEWAY");
        assert_eq!(
            method["tokenizationSpecification"]["parameters"]["gatewayMerchantId"],
            "gw-1"
        );
        assert_eq!(json["shippingAddressParameters"]["phoneNumberRequired"], true);
        assert_eq!(json["merchantInfo"]["merchantName"], "Sklep Testowy");
        let info = &json["transactionInfo"];
        assert_eq!(info["totalPrice"], "26.99");
        assert_eq!(info["currencyCode"], "PLN");
        assert_eq!(info["countryCode"], "PL");
        assert_eq!(info["checkoutOption"], "COMPLETE_IMMEDIATE_PURCHASE");
        assert_eq!(info["displayItems"][1]["type"], "SHIPPING_OPTION");
        assert_eq!(info["displayItems"][1]["status"], "FINAL");
    }
}
