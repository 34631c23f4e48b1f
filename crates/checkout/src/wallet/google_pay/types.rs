//! Google Pay API (v2) request and response shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationParameters {
    pub gateway: String,
    pub gateway_merchant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationSpecification {
    /// Always `PAYMENT_GATEWAY`.
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: TokenizationParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardParameters {
    pub allowed_auth_methods: Vec<String>,
    pub allowed_card_networks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSpec {
    /// Always `CARD`.
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: CardParameters,
    pub tokenization_specification: TokenizationSpecification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressParameters {
    pub phone_number_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionParameters {
    pub shipping_options: Vec<SelectionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_selected_option_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    pub merchant_id: String,
    pub merchant_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayItemType {
    LineItem,
    ShippingOption,
    Discount,
    Subtotal,
}

/// One row of the transaction summary; `price` is in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub label: String,
    pub price: String,
    #[serde(rename = "type")]
    pub kind: DisplayItemType,
    /// Always `FINAL`.
    pub status: String,
}

impl DisplayItem {
    pub(crate) fn new(label: impl Into<String>, price: impl Into<String>, kind: DisplayItemType) -> Self {
        Self {
            label: label.into(),
            price: price.into(),
            kind,
            status: "FINAL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub total_price_status: String,
    pub total_price_label: String,
    pub total_price: String,
    pub currency_code: String,
    pub country_code: String,
    pub checkout_option: String,
    pub display_items: Vec<DisplayItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackIntent {
    ShippingAddress,
    ShippingOption,
}

/// `PaymentDataRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataRequest {
    pub api_version: u8,
    pub api_version_minor: u8,
    pub callback_intents: Vec<CallbackIntent>,
    pub allowed_payment_methods: Vec<PaymentMethodSpec>,
    pub email_required: bool,
    pub shipping_address_parameters: ShippingAddressParameters,
    pub shipping_address_required: bool,
    pub shipping_option_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_parameters: Option<ShippingOptionParameters>,
    pub merchant_info: MerchantInfo,
    pub transaction_info: TransactionInfo,
}

/// Address as returned by Google Pay. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptionData {
    pub id: String,
}

/// Payload of `onPaymentDataChanged`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediatePaymentData {
    #[serde(default)]
    pub callback_trigger: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_option_data: Option<SelectionOptionData>,
}

/// Answer to `onPaymentDataChanged`; all `None` leaves the sheet as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataRequestUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_shipping_option_parameters: Option<ShippingOptionParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_transaction_info: Option<TransactionInfo>,
}

impl PaymentDataRequestUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.new_shipping_option_parameters.is_none() && self.new_transaction_info.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationData {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    #[serde(default)]
    pub card_network: Option<String>,
    #[serde(default)]
    pub card_details: Option<String>,
    #[serde(default)]
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub info: Option<CardInfo>,
    pub tokenization_data: TokenizationData,
}

/// Payload of `onLoadPaymentData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub api_version: u8,
    pub api_version_minor: u8,
    pub payment_method_data: PaymentMethodData,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_option_data: Option<SelectionOptionData>,
}
