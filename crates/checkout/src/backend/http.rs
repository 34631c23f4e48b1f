//! HTTP implementation of [`Backend`].
//!
//! Uses `reqwest` 0.13 for JSON endpoints and for Connect unary calls with
//! binary protobuf bodies.

use std::sync::Arc;

use async_trait::async_trait;
use bitsnap_core::ProductId;
use prost::Message;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::conversions::{
    convert_authorization, convert_authorization_outcome, convert_availability, convert_quote,
    convert_quote_request,
};
use super::rpc;
use super::{AuthorizationOutcome, Backend, BackendError, OneClickAvailability, PaymentLink};
use crate::config::CheckoutConfig;
use crate::link::LinkRequest;
use crate::pricing::QuoteRequest;
use crate::types::{Country, PreOrderQuote, ProductDetails};
use crate::wallet::OneClickAuthorization;

const PROTO_CONTENT_TYPE: &str = "application/proto";
const CONNECT_PROTOCOL_VERSION: &str = "1";

/// Response envelope of the product lookup.
#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<Vec<ProductDetails>>,
}

#[derive(Debug, Deserialize)]
struct BuyResponse {
    url: String,
    #[serde(rename = "sessionID", default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AutomaticCheckoutResponse {
    url: String,
}

/// Connect protocol error body.
#[derive(Debug, Deserialize)]
struct ConnectError {
    code: String,
    #[serde(default)]
    message: String,
}

// =============================================================================
// HttpBackend
// =============================================================================

/// Backend client for a single Bitsnap project.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    config: CheckoutConfig,
}

impl HttpBackend {
    /// Create a client for the configured project and host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CheckoutConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                config: config.clone(),
            }),
        })
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// POST a JSON body and read a JSON document.
    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &LinkRequest,
        bearer: Option<&SecretString>,
    ) -> Result<T, BackendError> {
        let mut request = self.inner.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token.expose_secret());
        }
        Self::read_json(request.send().await?).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Bitsnap API returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&response_text, 200),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text, 500),
                "Failed to parse Bitsnap API response"
            );
            BackendError::Parse(e)
        })
    }

    /// Execute a Connect unary call with binary protobuf bodies.
    async fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, BackendError>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let url = self.inner.config.rpc_url(method)?;

        let response = self
            .inner
            .client
            .post(url)
            .header(CONTENT_TYPE, PROTO_CONTENT_TYPE)
            .header("Connect-Protocol-Version", CONNECT_PROTOCOL_VERSION)
            .body(request.encode_to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::error!(
                method,
                status = %status,
                body = %truncate(&text, 500),
                "RPC call failed"
            );
            return Err(match serde_json::from_slice::<ConnectError>(&body) {
                Ok(error) => BackendError::Rpc {
                    code: error.code,
                    message: error.message,
                },
                Err(_) => BackendError::Status {
                    status: status.as_u16(),
                    body: truncate(&text, 200),
                },
            });
        }

        Ok(Resp::decode(body.as_ref())?)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self), fields(project_id = %self.inner.config.project_id, count = ids.len()))]
    async fn products(&self, ids: &[ProductId]) -> Result<Vec<ProductDetails>, BackendError> {
        let mut url = self.inner.config.commerce_url("/products")?;
        let joined = ids.iter().map(ProductId::as_str).collect::<Vec<_>>().join(",");
        url.query_pairs_mut().append_pair("ids", &joined);

        let envelope: ProductsEnvelope = self.get_json(url).await?;
        if !envelope.success && envelope.result.is_none() {
            return Err(BackendError::Rejected(
                envelope.message.unwrap_or_else(|| "products lookup failed".to_string()),
            ));
        }

        let products = envelope.result.unwrap_or_default();
        debug!(returned = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self), fields(project_id = %self.inner.config.project_id))]
    async fn countries(&self) -> Result<Vec<Country>, BackendError> {
        let url = self.inner.config.commerce_url("/countries")?;
        self.get_json(url).await
    }

    #[instrument(skip(self, request), fields(project_id = %self.inner.config.project_id))]
    async fn pre_order_details(&self, request: &QuoteRequest) -> Result<PreOrderQuote, BackendError> {
        let request = convert_quote_request(request, &self.inner.config.project_id);
        let response: rpc::GetPreOrderDetailsResponse =
            self.call("GetPreOrderDetails", &request).await?;
        convert_quote(response)
    }

    #[instrument(skip(self), fields(project_id = %self.inner.config.project_id))]
    async fn one_click_availability(&self) -> Result<OneClickAvailability, BackendError> {
        let request = rpc::IsOneClickPaymentAvailableRequest {
            project_id: self.inner.config.project_id.to_string(),
        };
        let response: rpc::IsOneClickPaymentAvailableResponse =
            self.call("IsOneClickPaymentAvailable", &request).await?;
        Ok(convert_availability(response))
    }

    #[instrument(skip(self, validation_url), fields(project_id = %self.inner.config.project_id))]
    async fn validate_apple_pay_merchant(&self, validation_url: &str) -> Result<String, BackendError> {
        let request = rpc::ApplePayValidateMerchantRequest {
            validation_url: validation_url.to_string(),
            project_id: Some(self.inner.config.project_id.to_string()),
        };
        let response: rpc::ApplePayValidateMerchantResponse =
            self.call("ApplePayValidateMerchant", &request).await?;
        Ok(response.merchant_session)
    }

    #[instrument(
        skip(self, authorization),
        fields(project_id = %self.inner.config.project_id, gateway = ?authorization.gateway)
    )]
    async fn authorize_one_click_payment(
        &self,
        authorization: &OneClickAuthorization,
    ) -> Result<AuthorizationOutcome, BackendError> {
        let request = convert_authorization(authorization, &self.inner.config.project_id);
        let response: rpc::OneClickAuthorizePaymentResponse =
            self.call("AuthorizeOneClickPayment", &request).await?;
        Ok(convert_authorization_outcome(response))
    }

    #[instrument(skip(self, link), fields(project_id = %self.inner.config.project_id, items = link.items.len()))]
    async fn create_payment_link(&self, link: &LinkRequest) -> Result<PaymentLink, BackendError> {
        let url = self.inner.config.commerce_url("/buy")?;
        let response: BuyResponse = self.post_json(url, link, None).await?;
        Ok(PaymentLink {
            url: response.url,
            session_id: response.session_id,
        })
    }

    #[instrument(skip(self, link, api_key), fields(project_id = %self.inner.config.project_id, test_mode))]
    async fn create_automatic_checkout(
        &self,
        link: &LinkRequest,
        api_key: Option<&SecretString>,
        test_mode: bool,
    ) -> Result<String, BackendError> {
        let url = self.inner.config.automatic_link_url(test_mode)?;
        let response: AutomaticCheckoutResponse = self.post_json(url, link, api_key).await?;
        Ok(response.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("zażółć", 3), "zaż");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
