//! Conversions between domain types and `PublicApiService` messages.

use bitsnap_core::{DeliveryMethodId, MinorUnits, ProjectId};

use super::rpc::{self, one_click_authorize_payment_request::Gateway};
use super::{AuthorizationOutcome, BackendError, OneClickAvailability};
use crate::pricing::QuoteRequest;
use crate::types::{DeliveryMethod, GooglePayConfig, PreOrderQuote};
use crate::wallet::{OneClickAuthorization, PostalAddress, WalletGateway};

pub fn convert_quote_request(
    request: &QuoteRequest,
    project_id: &ProjectId,
) -> rpc::GetPreOrderDetailsRequest {
    rpc::GetPreOrderDetailsRequest {
        items: request
            .items
            .iter()
            .map(|item| rpc::PreOrderItem {
                id: item.id.to_string(),
                quantity: i32::try_from(item.quantity).unwrap_or(i32::MAX),
            })
            .collect(),
        project_id: project_id.to_string(),
        post_code: request.postal_code.clone(),
        coupon_code: request.coupon_code.clone(),
        country_code: request.country.clone(),
        selected_delivery_method: request.delivery_method.as_ref().map(ToString::to_string),
        email: request.email.clone(),
        phone: request.phone.clone(),
    }
}

pub fn convert_quote(response: rpc::GetPreOrderDetailsResponse) -> Result<PreOrderQuote, BackendError> {
    let total_amount = response
        .total_amount
        .ok_or(BackendError::MissingField("totalAmount"))?;

    Ok(PreOrderQuote {
        total_amount: MinorUnits::new(total_amount),
        currency: response.currency,
        country: response.country,
        methods: response.methods.into_iter().map(convert_delivery_method).collect(),
        selected_delivery_method: response
            .selected_delivery_method
            .filter(|id| !id.is_empty())
            .map(DeliveryMethodId::new),
        coupon_code: response.coupon_code.filter(|code| !code.is_empty()),
        coupon_value: response.coupon_value.map(MinorUnits::new),
    })
}

fn convert_delivery_method(method: rpc::DeliveryMethod) -> DeliveryMethod {
    DeliveryMethod {
        id: DeliveryMethodId::new(method.id),
        name: method.name,
        amount: MinorUnits::new(method.amount),
        description: method.description,
        min_days: method.min_days.and_then(|d| u32::try_from(d).ok()),
        max_days: method.max_days.and_then(|d| u32::try_from(d).ok()),
    }
}

pub fn convert_availability(response: rpc::IsOneClickPaymentAvailableResponse) -> OneClickAvailability {
    let google_pay_config = match (response.google_pay, response.google_pay_config) {
        (true, Some(config)) => Some(GooglePayConfig {
            is_available: true,
            merchant_id: config.merchant_id,
            merchant_name: config.merchant_name,
            gateway: config.gateway,
            gateway_id: config.gateway_merchant_id,
        }),
        _ => None,
    };

    OneClickAvailability {
        apple_pay: response.apple_pay,
        google_pay: response.google_pay,
        google_pay_config,
    }
}

pub fn convert_authorization(
    authorization: &OneClickAuthorization,
    project_id: &ProjectId,
) -> rpc::OneClickAuthorizePaymentRequest {
    let gateway = match authorization.gateway {
        WalletGateway::ApplePay => Gateway::ApplePay,
        WalletGateway::GooglePay => Gateway::GooglePay,
    };

    rpc::OneClickAuthorizePaymentRequest {
        gateway: gateway as i32,
        payment_data: authorization.payment_data.clone(),
        payment_method: authorization.payment_method.clone(),
        transaction_identifier: authorization.transaction_identifier.clone(),
        order: Some(convert_quote_request(&authorization.order, project_id)),
        shipping_address: Some(convert_address(&authorization.shipping_address)),
        billing_address: Some(convert_billing_address(&authorization.billing_address)),
        metadata: authorization.metadata.clone(),
    }
}

fn convert_address(address: &PostalAddress) -> rpc::Address {
    rpc::Address {
        name: address.name.clone(),
        line1: address.line1.clone(),
        line2: None,
        city: address.city.clone(),
        zip_code: address.zip_code.clone(),
        country: address.country.clone(),
    }
}

fn convert_billing_address(address: &PostalAddress) -> rpc::BillingAddress {
    rpc::BillingAddress {
        name: address.name.clone(),
        line1: address.line1.clone(),
        line2: None,
        city: address.city.clone(),
        zip_code: address.zip_code.clone(),
        country: address.country.clone(),
        nip: None,
    }
}

pub fn convert_authorization_outcome(
    response: rpc::OneClickAuthorizePaymentResponse,
) -> AuthorizationOutcome {
    AuthorizationOutcome {
        is_success: response.is_success,
        redirect_url: response.redirect_url.filter(|url| !url.is_empty()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bitsnap_core::ProductId;

    use super::*;
    use crate::pricing::QuoteItem;

    #[test]
    fn test_convert_quote_request() {
        let request = QuoteRequest {
            items: vec![QuoteItem {
                id: ProductId::new("p1"),
                quantity: 2,
            }],
            country: Some("PL".to_string()),
            coupon_code: Some("X10".to_string()),
            delivery_method: Some(DeliveryMethodId::new("inpost")),
            ..QuoteRequest::default()
        };
        let rpc = convert_quote_request(&request, &ProjectId::new("proj"));
        assert_eq!(rpc.project_id, "proj");
        assert_eq!(rpc.items[0].quantity, 2);
        assert_eq!(rpc.country_code.as_deref(), Some("PL"));
        assert_eq!(rpc.selected_delivery_method.as_deref(), Some("inpost"));
        assert_eq!(rpc.post_code, None);
    }

    #[test]
    fn test_convert_quote_requires_total() {
        let response = rpc::GetPreOrderDetailsResponse::default();
        assert!(matches!(
            convert_quote(response),
            Err(BackendError::MissingField("totalAmount"))
        ));
    }

    #[test]
    fn test_convert_quote() {
        let response = rpc::GetPreOrderDetailsResponse {
            total_amount: Some(6699),
            currency: "PLN".to_string(),
            country: "PL".to_string(),
            methods: vec![rpc::DeliveryMethod {
                id: "inpost".to_string(),
                name: "InPost".to_string(),
                amount: 1699,
                description: None,
                min_days: Some(-1),
                max_days: Some(3),
            }],
            selected_delivery_method: Some(String::new()),
            coupon_code: Some("X10".to_string()),
            coupon_value: Some(500),
        };
        let quote = convert_quote(response).unwrap();
        assert_eq!(quote.total_amount, MinorUnits::new(6699));
        assert_eq!(quote.selected_delivery_method, None);
        assert_eq!(quote.methods[0].min_days, None);
        assert_eq!(quote.methods[0].max_days, Some(3));
        assert_eq!(quote.coupon(), Some(("X10", MinorUnits::new(500))));
    }

    #[test]
    fn test_convert_availability_requires_config() {
        let availability = convert_availability(rpc::IsOneClickPaymentAvailableResponse {
            apple_pay: true,
            google_pay: true,
            google_pay_config: None,
        });
        assert!(availability.apple_pay);
        assert_eq!(availability.google_pay_config, None);

        let availability = convert_availability(rpc::IsOneClickPaymentAvailableResponse {
            apple_pay: false,
            google_pay: true,
            google_pay_config: Some(rpc::GooglePayConfig {
                gateway: "przelewy24".to_string(),
                gateway_merchant_id: "gw-1".to_string(),
                merchant_id: "m-1".to_string(),
                merchant_name: "Sklep".to_string(),
            }),
        });
        let config = availability.google_pay_config.unwrap();
        assert!(config.is_available);
        assert_eq!(config.gateway_id, "gw-1");
    }
}
