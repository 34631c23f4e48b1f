//! Scripted in-process backend for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bitsnap_core::{DeliveryMethodId, MinorUnits, ProductId};
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::oneshot;

use crate::backend::{AuthorizationOutcome, Backend, BackendError, OneClickAvailability, PaymentLink};
use crate::link::LinkRequest;
use crate::pricing::QuoteRequest;
use crate::types::{Country, DeliveryMethod, GooglePayConfig, PreOrderQuote, ProductDetails};
use crate::wallet::OneClickAuthorization;

type QuoteHandler = Box<dyn Fn(&QuoteRequest) -> Result<PreOrderQuote, BackendError> + Send + Sync>;

pub fn scripted_error() -> BackendError {
    BackendError::Status {
        status: 500,
        body: "scripted failure".to_string(),
    }
}

pub fn product(id: &str, name: &str, price: i64, deliverable: bool) -> ProductDetails {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "price": price,
        "currency": "PLN",
        "isDeliverable": deliverable
    }))
    .unwrap()
}

pub fn delivery_method(id: &str, name: &str, amount: i64) -> DeliveryMethod {
    DeliveryMethod {
        id: DeliveryMethodId::new(id),
        name: name.to_string(),
        amount: MinorUnits::new(amount),
        description: Some(format!("{name} delivery")),
        min_days: Some(1),
        max_days: None,
    }
}

pub fn quote(total: i64) -> PreOrderQuote {
    PreOrderQuote {
        total_amount: MinorUnits::new(total),
        currency: "PLN".to_string(),
        country: "PL".to_string(),
        methods: Vec::new(),
        selected_delivery_method: None,
        coupon_code: None,
        coupon_value: None,
    }
}

pub fn google_pay_config() -> GooglePayConfig {
    GooglePayConfig {
        is_available: true,
        merchant_id: "BCR2DN4T".to_string(),
        merchant_name: "Sklep Testowy".to_string(),
        gateway: "przelewy24".to_string(),
        gateway_id: "gw-1".to_string(),
    }
}

pub struct FakeBackend {
    products: Option<Vec<ProductDetails>>,
    countries: Option<Vec<Country>>,
    quote_handler: QuoteHandler,
    availability: Option<OneClickAvailability>,
    merchant_session: Option<String>,
    authorization: Option<AuthorizationOutcome>,
    link_url: Option<String>,
    quote_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    product_requests: Mutex<Vec<Vec<ProductId>>>,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    availability_calls: Mutex<usize>,
    country_calls: Mutex<usize>,
    authorizations: Mutex<Vec<OneClickAuthorization>>,
    links: Mutex<Vec<LinkRequest>>,
    automatic: Mutex<Vec<(bool, bool)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            products: Some(Vec::new()),
            countries: Some(Vec::new()),
            quote_handler: Box::new(|_| Ok(quote(0))),
            availability: Some(OneClickAvailability::default()),
            merchant_session: Some(String::new()),
            authorization: Some(AuthorizationOutcome {
                is_success: true,
                redirect_url: None,
            }),
            link_url: Some("https://pay.bitsnap.pl/s/abc".to_string()),
            quote_gates: Mutex::new(HashMap::new()),
            product_requests: Mutex::new(Vec::new()),
            quote_requests: Mutex::new(Vec::new()),
            availability_calls: Mutex::new(0),
            country_calls: Mutex::new(0),
            authorizations: Mutex::new(Vec::new()),
            links: Mutex::new(Vec::new()),
            automatic: Mutex::new(Vec::new()),
        }
    }

    pub fn with_products(mut self, products: Vec<ProductDetails>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn failing_products(mut self) -> Self {
        self.products = None;
        self
    }

    pub fn with_countries(mut self, countries: Vec<Country>) -> Self {
        self.countries = Some(countries);
        self
    }

    pub fn failing_countries(mut self) -> Self {
        self.countries = None;
        self
    }

    pub fn with_quote(mut self, quote: PreOrderQuote) -> Self {
        self.quote_handler = Box::new(move |_| Ok(quote.clone()));
        self
    }

    pub fn with_quote_handler(
        mut self,
        handler: impl Fn(&QuoteRequest) -> Result<PreOrderQuote, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.quote_handler = Box::new(handler);
        self
    }

    pub fn failing_quotes(self) -> Self {
        self.with_quote_handler(|_| Err(scripted_error()))
    }

    pub fn with_availability(mut self, availability: OneClickAvailability) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn failing_availability(mut self) -> Self {
        self.availability = None;
        self
    }

    pub fn with_merchant_session(mut self, session: Option<&str>) -> Self {
        self.merchant_session = session.map(ToString::to_string);
        self
    }

    pub fn with_authorization(mut self, outcome: Option<AuthorizationOutcome>) -> Self {
        self.authorization = outcome;
        self
    }

    pub fn with_link_url(mut self, url: Option<&str>) -> Self {
        self.link_url = url.map(ToString::to_string);
        self
    }

    /// Hold quotes whose coupon is `coupon` until the returned sender fires.
    pub fn gate_quote(&self, coupon: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.quote_gates.lock().unwrap().insert(coupon.to_string(), rx);
        tx
    }

    pub fn product_requests(&self) -> Vec<Vec<ProductId>> {
        self.product_requests.lock().unwrap().clone()
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn availability_calls(&self) -> usize {
        *self.availability_calls.lock().unwrap()
    }

    pub fn country_calls(&self) -> usize {
        *self.country_calls.lock().unwrap()
    }

    pub fn authorizations(&self) -> Vec<OneClickAuthorization> {
        self.authorizations.lock().unwrap().clone()
    }

    pub fn links(&self) -> Vec<LinkRequest> {
        self.links.lock().unwrap().clone()
    }

    pub fn automatic_calls(&self) -> Vec<(bool, bool)> {
        self.automatic.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn products(&self, ids: &[ProductId]) -> Result<Vec<ProductDetails>, BackendError> {
        self.product_requests.lock().unwrap().push(ids.to_vec());
        self.products.clone().ok_or_else(scripted_error)
    }

    async fn countries(&self) -> Result<Vec<Country>, BackendError> {
        *self.country_calls.lock().unwrap() += 1;
        self.countries.clone().ok_or_else(scripted_error)
    }

    async fn pre_order_details(&self, request: &QuoteRequest) -> Result<PreOrderQuote, BackendError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        let gate = request
            .coupon_code
            .as_ref()
            .and_then(|coupon| self.quote_gates.lock().unwrap().remove(coupon));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        (self.quote_handler)(request)
    }

    async fn one_click_availability(&self) -> Result<OneClickAvailability, BackendError> {
        *self.availability_calls.lock().unwrap() += 1;
        self.availability.clone().ok_or_else(scripted_error)
    }

    async fn validate_apple_pay_merchant(&self, _validation_url: &str) -> Result<String, BackendError> {
        self.merchant_session.clone().ok_or_else(scripted_error)
    }

    async fn authorize_one_click_payment(
        &self,
        authorization: &OneClickAuthorization,
    ) -> Result<AuthorizationOutcome, BackendError> {
        self.authorizations.lock().unwrap().push(authorization.clone());
        self.authorization.clone().ok_or_else(scripted_error)
    }

    async fn create_payment_link(&self, link: &LinkRequest) -> Result<PaymentLink, BackendError> {
        self.links.lock().unwrap().push(link.clone());
        self.link_url
            .clone()
            .map(|url| PaymentLink {
                url,
                session_id: Some("sess_1".to_string()),
            })
            .ok_or_else(scripted_error)
    }

    async fn create_automatic_checkout(
        &self,
        link: &LinkRequest,
        api_key: Option<&SecretString>,
        test_mode: bool,
    ) -> Result<String, BackendError> {
        self.links.lock().unwrap().push(link.clone());
        self.automatic
            .lock()
            .unwrap()
            .push((api_key.is_some(), test_mode));
        self.link_url.clone().ok_or_else(scripted_error)
    }
}
