//! Quote to Apple Pay sheet mapping.

use bitsnap_core::{CountryCode, DEFAULT_CURRENCY, MinorUnits};

use super::types::{
    ApplePayPaymentRequest, DateComponents, DateComponentsRange, LineItem, LineItemType,
    ShippingMethod,
};
use crate::types::{PreOrderQuote, ResolvedProduct};
use crate::wallet::{ButtonItem, TOTAL_LABEL};

/// Estimated shipping shown before the first quote arrives.
pub const PLACEHOLDER_SHIPPING: MinorUnits = MinorUnits::new(1699);

/// Label of the placeholder shipping line.
pub const PLACEHOLDER_SHIPPING_LABEL: &str = "Dostawa";

const SUPPORTED_NETWORKS: [&str; 2] = ["visa", "masterCard"];
const CONTACT_FIELDS: [&str; 4] = ["name", "email", "postalAddress", "phone"];
const DEFAULT_MIN_DAYS: u32 = 1;
const DEFAULT_MAX_DAYS: u32 = 14;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Request used to open the sheet, estimated from client-side item prices.
#[must_use]
pub fn provisional_request(items: &[ButtonItem], country: &CountryCode) -> ApplePayPaymentRequest {
    let requires_shipping = items.iter().any(|item| item.is_deliverable);
    let total: MinorUnits = items.iter().map(|item| item.price.times(item.quantity)).sum();

    let mut line_items: Vec<LineItem> = items
        .iter()
        .map(|item| {
            LineItem::new(
                item.name.clone(),
                item.price.times(item.quantity).display(),
                LineItemType::Final,
            )
        })
        .collect();
    if requires_shipping {
        line_items.push(LineItem::new(
            PLACEHOLDER_SHIPPING_LABEL,
            PLACEHOLDER_SHIPPING.display(),
            LineItemType::Pending,
        ));
    }

    ApplePayPaymentRequest {
        country_code: country.to_string(),
        currency_code: DEFAULT_CURRENCY.to_string(),
        merchant_capabilities: strings(&["supports3DS"]),
        supported_networks: strings(&SUPPORTED_NETWORKS),
        total: LineItem::new(TOTAL_LABEL, total.display(), LineItemType::Pending),
        line_items,
        shipping_methods: requires_shipping.then(Vec::new),
        supports_coupon_code: requires_shipping.then_some(true),
        required_billing_contact_fields: requires_shipping.then(|| strings(&CONTACT_FIELDS)),
        required_shipping_contact_fields: requires_shipping.then(|| strings(&CONTACT_FIELDS)),
    }
}

/// Sheet lines for a quote: products, the selected delivery, the coupon.
#[must_use]
pub fn line_items(products: &[ResolvedProduct], quote: &PreOrderQuote) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = products
        .iter()
        .map(|p| {
            LineItem::new(
                format!("{} - {}", p.details.name, p.quantity),
                p.line_total().display(),
                LineItemType::Final,
            )
        })
        .collect();

    if let Some(method) = quote.selected_method() {
        items.push(LineItem::new(
            method.name.clone(),
            method.amount.display(),
            LineItemType::Final,
        ));
    }

    if let Some((code, value)) = quote.coupon() {
        items.push(LineItem::new(
            code,
            format!("-{}", value.display()),
            LineItemType::Final,
        ));
    }

    items
}

/// Every delivery method the quote offers, with day ranges.
#[must_use]
pub fn shipping_methods(quote: &PreOrderQuote) -> Vec<ShippingMethod> {
    quote
        .methods
        .iter()
        .map(|method| ShippingMethod {
            label: method.name.clone(),
            detail: method.description.clone().unwrap_or_default(),
            amount: method.amount.display(),
            identifier: method.id.to_string(),
            date_components_range: Some(DateComponentsRange {
                start_date_components: DateComponents::days(method.min_days.unwrap_or(DEFAULT_MIN_DAYS)),
                end_date_components: DateComponents::days(method.max_days.unwrap_or(DEFAULT_MAX_DAYS)),
            }),
        })
        .collect()
}

/// The full request for a settled quote.
#[must_use]
pub fn payment_request(
    products: &[ResolvedProduct],
    quote: &PreOrderQuote,
    country: &CountryCode,
) -> ApplePayPaymentRequest {
    let currency = if quote.currency.is_empty() {
        DEFAULT_CURRENCY
    } else {
        quote.currency.as_str()
    };

    ApplePayPaymentRequest {
        country_code: country.to_string(),
        currency_code: currency.to_string(),
        merchant_capabilities: strings(&["supports3DS", "supportsCredit", "supportsDebit"]),
        supported_networks: strings(&SUPPORTED_NETWORKS),
        total: LineItem::new(TOTAL_LABEL, quote.total_amount.display(), LineItemType::Final),
        line_items: line_items(products, quote),
        shipping_methods: Some(shipping_methods(quote)),
        supports_coupon_code: None,
        required_billing_contact_fields: None,
        required_shipping_contact_fields: None,
    }
}
