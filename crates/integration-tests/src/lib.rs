//! Integration tests for the Bitsnap checkout.
//!
//! Every test stands up a `wiremock` server in place of the Bitsnap backend
//! and drives a real [`CheckoutContext`] with the HTTP backend against it.
//! Checkouts are kept in memory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bitsnap-integration-tests
//! ```

use std::sync::Arc;

use bitsnap_checkout::backend::{Backend, HttpBackend};
use bitsnap_checkout::{CheckoutConfig, CheckoutContext, MemoryStorage};
use prost::Message;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Project every test runs against.
pub const PROJECT_ID: &str = "proj_test";

/// A mocked backend and a context wired to it.
pub struct TestBackend {
    pub server: MockServer,
    pub ctx: CheckoutContext,
}

impl TestBackend {
    /// Start a mock server and build a context for [`PROJECT_ID`].
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is rejected or the HTTP client cannot
    /// be built.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = CheckoutConfig::new(PROJECT_ID)
            .with_host(&server.uri())
            .expect("mock server URI is a valid host");
        let backend = HttpBackend::new(&config).expect("failed to build HTTP backend");
        let ctx = CheckoutContext::new(
            config,
            Arc::new(backend) as Arc<dyn Backend>,
            Arc::new(MemoryStorage::new()),
        );
        Self { server, ctx }
    }

    /// Path of a public-commerce endpoint.
    #[must_use]
    pub fn commerce_path(endpoint: &str) -> String {
        format!("/api/integrations/{PROJECT_ID}/public-commerce{endpoint}")
    }

    /// Path of a `PublicApiService` RPC.
    #[must_use]
    pub fn rpc_path(rpc: &str) -> String {
        format!("/api/rpc/public.v1.PublicApiService/{rpc}")
    }

    /// Serve `products` from the product lookup.
    pub async fn mount_products(&self, products: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(Self::commerce_path("/products")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "result": products,
                })),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer every call of `rpc` with `response`.
    pub async fn mount_rpc<M: Message>(&self, rpc: &str, response: &M) {
        Mock::given(method("POST"))
            .and(path(Self::rpc_path(rpc)))
            .and(header("content-type", "application/proto"))
            .and(header("connect-protocol-version", "1"))
            .respond_with(proto_response(response))
            .mount(&self.server)
            .await;
    }

    /// Decoded bodies of every `rpc` call received so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if request recording is off or a body is not a valid `M`.
    pub async fn received_rpc<M: Message + Default>(&self, rpc: &str) -> Vec<M> {
        let rpc_path = Self::rpc_path(rpc);
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
            .iter()
            .filter(|request| request.url.path() == rpc_path)
            .map(|request| M::decode(request.body.as_slice()).expect("valid protobuf body"))
            .collect()
    }
}

/// A binary Connect response carrying `message`.
pub fn proto_response<M: Message>(message: &M) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/proto")
        .set_body_bytes(message.encode_to_vec())
}

/// Product lookup entry.
#[must_use]
pub fn product_json(id: &str, name: &str, price: i64, deliverable: bool) -> Value {
    json!({
        "id": id,
        "ownerID": "owner_1",
        "name": name,
        "price": price,
        "currency": "PLN",
        "isDeliverable": deliverable,
    })
}
