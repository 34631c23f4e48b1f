// Messages of the `public.v1.PublicApiService` and `common.v1` address types.
//
// Field numbers follow the service's public_api.proto; keep them in sync when
// the backend schema changes.

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Address {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub line1: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub line2: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, tag = "4")]
    pub city: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub zip_code: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub country: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BillingAddress {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub line1: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub line2: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, tag = "4")]
    pub city: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub zip_code: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub country: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "7")]
    pub nip: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreOrderItem {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPreOrderDetailsRequest {
    #[prost(message, repeated, tag = "1")]
    pub items: ::prost::alloc::vec::Vec<PreOrderItem>,
    #[prost(string, tag = "2")]
    pub project_id: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub post_code: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "4")]
    pub coupon_code: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "5")]
    pub country_code: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub selected_delivery_method: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub email: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub phone: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeliveryMethod {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub amount: i64,
    #[prost(string, optional, tag = "4")]
    pub description: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int32, optional, tag = "5")]
    pub min_days: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub max_days: ::core::option::Option<i32>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPreOrderDetailsResponse {
    #[prost(int64, optional, tag = "1")]
    pub total_amount: ::core::option::Option<i64>,
    #[prost(string, tag = "2")]
    pub currency: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub country: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub methods: ::prost::alloc::vec::Vec<DeliveryMethod>,
    #[prost(string, optional, tag = "5")]
    pub selected_delivery_method: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub coupon_code: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int64, optional, tag = "7")]
    pub coupon_value: ::core::option::Option<i64>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsOneClickPaymentAvailableRequest {
    #[prost(string, tag = "1")]
    pub project_id: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GooglePayConfig {
    #[prost(string, tag = "1")]
    pub gateway: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub gateway_merchant_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub merchant_id: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub merchant_name: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsOneClickPaymentAvailableResponse {
    #[prost(bool, tag = "1")]
    pub apple_pay: bool,
    #[prost(bool, tag = "2")]
    pub google_pay: bool,
    #[prost(message, optional, tag = "3")]
    pub google_pay_config: ::core::option::Option<GooglePayConfig>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplePayValidateMerchantRequest {
    #[prost(string, tag = "1")]
    pub validation_url: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "2")]
    pub project_id: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplePayValidateMerchantResponse {
    #[prost(string, tag = "1")]
    pub merchant_session: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OneClickAuthorizePaymentRequest {
    #[prost(enumeration = "one_click_authorize_payment_request::Gateway", tag = "1")]
    pub gateway: i32,
    #[prost(string, tag = "2")]
    pub payment_data: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub payment_method: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub transaction_identifier: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "5")]
    pub order: ::core::option::Option<GetPreOrderDetailsRequest>,
    #[prost(message, optional, tag = "6")]
    pub shipping_address: ::core::option::Option<Address>,
    #[prost(message, optional, tag = "7")]
    pub billing_address: ::core::option::Option<BillingAddress>,
    #[prost(string, optional, tag = "8")]
    pub metadata: ::core::option::Option<::prost::alloc::string::String>,
}
/// Nested message and enum types in `OneClickAuthorizePaymentRequest`.
pub mod one_click_authorize_payment_request {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Gateway {
        Unspecified = 0,
        ApplePay = 1,
        GooglePay = 2,
    }
    impl Gateway {
        /// String value of the enum field names used in the ProtoBuf definition.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Self::Unspecified => "GATEWAY_UNSPECIFIED",
                Self::ApplePay => "GATEWAY_APPLE_PAY",
                Self::GooglePay => "GATEWAY_GOOGLE_PAY",
            }
        }
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OneClickAuthorizePaymentResponse {
    #[prost(bool, tag = "1")]
    pub is_success: bool,
    #[prost(string, optional, tag = "2")]
    pub redirect_url: ::core::option::Option<::prost::alloc::string::String>,
}
