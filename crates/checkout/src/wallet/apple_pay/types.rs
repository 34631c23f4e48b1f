//! Apple Pay JS payment sheet shapes.

use serde::{Deserialize, Serialize};

/// Whether an amount is final or still an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemType {
    Final,
    Pending,
}

/// A line on the sheet; `amount` is a decimal string in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: LineItemType,
}

impl LineItem {
    pub(crate) fn new(label: impl Into<String>, amount: impl Into<String>, kind: LineItemType) -> Self {
        Self {
            label: label.into(),
            amount: amount.into(),
            kind,
        }
    }
}

/// Relative date used in delivery estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateComponents {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
}

impl DateComponents {
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            years: 0,
            months: 0,
            days,
            hours: 0,
        }
    }
}

/// Delivery window of a shipping method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateComponentsRange {
    pub start_date_components: DateComponents,
    pub end_date_components: DateComponents,
}

/// A shipping method offered on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub label: String,
    pub detail: String,
    pub amount: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_components_range: Option<DateComponentsRange>,
}

/// `ApplePayPaymentRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayPaymentRequest {
    pub country_code: String,
    pub currency_code: String,
    pub merchant_capabilities: Vec<String>,
    pub supported_networks: Vec<String>,
    pub total: LineItem,
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_methods: Option<Vec<ShippingMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_coupon_code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_billing_contact_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_shipping_contact_fields: Option<Vec<String>>,
}

/// Contact reported by the sheet. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentContact {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub address_lines: Option<Vec<String>>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl PaymentContact {
    pub(crate) fn first_address_line(&self) -> String {
        self.address_lines
            .as_ref()
            .and_then(|lines| lines.first())
            .cloned()
            .unwrap_or_default()
    }
}

/// `ApplePayPaymentToken`; data and method are passed through as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentToken {
    pub payment_data: serde_json::Value,
    pub payment_method: serde_json::Value,
    pub transaction_identifier: String,
}

/// `ApplePayPayment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub token: PaymentToken,
    #[serde(default)]
    pub billing_contact: Option<PaymentContact>,
    #[serde(default)]
    pub shipping_contact: Option<PaymentContact>,
}

/// Error codes the sheet can display next to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplePayErrorCode {
    CouponCodeInvalid,
    CouponCodeExpired,
    ShippingContactInvalid,
    BillingContactInvalid,
    AddressUnserviceable,
    Unknown,
}

/// `ApplePayError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayError {
    pub code: ApplePayErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// New totals for a `complete*Selection` / `completeCouponCodeChange` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayUpdate {
    pub new_total: LineItem,
    pub new_line_items: Vec<LineItem>,
    pub new_shipping_methods: Vec<ShippingMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApplePayError>,
}

impl ApplePayUpdate {
    /// The update carried by a fully quoted request.
    #[must_use]
    pub fn from_request(request: &ApplePayPaymentRequest) -> Self {
        Self {
            new_total: request.total.clone(),
            new_line_items: request.line_items.clone(),
            new_shipping_methods: request.shipping_methods.clone().unwrap_or_default(),
            errors: Vec::new(),
        }
    }
}
