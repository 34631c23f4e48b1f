//! Shared checkout context.
//!
//! One context per browser-like session: configuration, the backend client,
//! the persisted store and the quote board. Cloning is cheap; every clone
//! sees the same store and board.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use crate::backend::{Backend, HttpBackend, PaymentLink};
use crate::cart::CartShell;
use crate::config::CheckoutConfig;
use crate::error::CheckoutError;
use crate::link::{CheckoutRedirect, LinkRequest};
use crate::pricing::{QuoteRequest, Quoter, Settlement};
use crate::products::resolve_products;
use crate::store::{CheckoutStorage, CheckoutStore, FileStorage};
use crate::types::{Checkout, Country, ResolvedProduct};
use crate::wallet::{ApplePaySession, ButtonItem, GooglePayAdapter};

/// Handle to everything a checkout session needs.
#[derive(Clone)]
pub struct CheckoutContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: CheckoutConfig,
    backend: Arc<dyn Backend>,
    store: CheckoutStore,
    quoter: Quoter,
    countries: Cache<String, Vec<Country>>,
}

impl std::fmt::Debug for CheckoutContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutContext")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .finish_non_exhaustive()
    }
}

impl CheckoutContext {
    /// Assemble a context from its parts.
    #[must_use]
    pub fn new(
        config: CheckoutConfig,
        backend: Arc<dyn Backend>,
        storage: Arc<dyn CheckoutStorage>,
    ) -> Self {
        let store = CheckoutStore::new(storage, config.default_country.clone());
        let quoter = Quoter::new(Arc::clone(&backend));
        let countries = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            inner: Arc::new(ContextInner {
                config,
                backend,
                store,
                quoter,
                countries,
            }),
        }
    }

    /// HTTP backend plus file storage under `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: CheckoutConfig) -> Result<Self, CheckoutError> {
        let backend = HttpBackend::new(&config)?;
        let storage = FileStorage::new(config.storage_path.clone());
        Ok(Self::new(config, Arc::new(backend), Arc::new(storage)))
    }

    #[must_use]
    pub fn config(&self) -> &CheckoutConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    #[must_use]
    pub fn store(&self) -> &CheckoutStore {
        &self.inner.store
    }

    #[must_use]
    pub fn quoter(&self) -> &Quoter {
        &self.inner.quoter
    }

    // =========================================================================
    // Products and Quotes
    // =========================================================================

    /// Resolve the stored cart against the catalogue.
    pub async fn resolve_products(&self) -> Vec<ResolvedProduct> {
        let checkout = self.store().get();
        resolve_products(self.backend().as_ref(), &checkout).await
    }

    /// Countries the project ships to, cached for 5 minutes.
    ///
    /// A failed fetch yields an empty list and is not cached.
    #[instrument(skip(self), fields(project_id = %self.config().project_id))]
    pub async fn available_countries(&self) -> Vec<Country> {
        let key = self.config().project_id.to_string();
        if let Some(countries) = self.inner.countries.get(&key).await {
            debug!("Cache hit for countries");
            return countries;
        }

        match self.backend().countries().await {
            Ok(countries) => {
                self.inner.countries.insert(key, countries.clone()).await;
                countries
            }
            Err(e) => {
                warn!(error = %e, "Cannot fetch countries, showing none");
                Vec::new()
            }
        }
    }

    /// Quote the stored cart.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the quote fails.
    pub async fn quote(&self) -> Result<Settlement, CheckoutError> {
        let (_, _, settlement) = self.quote_cart().await?;
        Ok(settlement)
    }

    /// Read, resolve and quote the cart in one go.
    pub(crate) async fn quote_cart(
        &self,
    ) -> Result<(Checkout, Vec<ResolvedProduct>, Settlement), CheckoutError> {
        let checkout = self.store().get();
        let products = resolve_products(self.backend().as_ref(), &checkout).await;
        let request = QuoteRequest::from_checkout(&checkout, &products);
        let settlement = self.quoter().quote(&request).await?;
        Ok((checkout, products, settlement))
    }

    // =========================================================================
    // Payment Links
    // =========================================================================

    /// Create a hosted payment link, tagging it with the stored reference.
    ///
    /// # Errors
    ///
    /// Returns `BadInput` for an invalid request, or the backend error.
    #[instrument(skip(self, link), fields(project_id = %self.config().project_id, items = link.items.len()))]
    pub async fn create_payment_url(&self, mut link: LinkRequest) -> Result<PaymentLink, CheckoutError> {
        link.inject_reference(self.store().reference());
        link.validate()?;

        let payment = self
            .backend()
            .create_payment_link(&link)
            .await
            .map_err(|e| CheckoutError::from(e).report())?;
        info!(session_id = ?payment.session_id, "Payment link created");
        Ok(payment)
    }

    /// Create a checkout through the automatic link endpoint.
    ///
    /// # Errors
    ///
    /// Returns `BadInput` for an invalid request, or the backend error.
    #[instrument(skip(self, link, api_key), fields(project_id = %self.config().project_id))]
    pub async fn create_checkout(
        &self,
        mut link: LinkRequest,
        api_key: Option<&SecretString>,
        test_mode: bool,
    ) -> Result<CheckoutRedirect, CheckoutError> {
        link.inject_reference(self.store().reference());
        link.validate()?;

        let redirect_url = self
            .backend()
            .create_automatic_checkout(&link, api_key, test_mode)
            .await
            .map_err(|e| CheckoutError::from(e).report())?;
        Ok(CheckoutRedirect {
            status: "ok",
            redirect_url,
        })
    }

    // =========================================================================
    // Surfaces
    // =========================================================================

    /// The cart panel.
    #[must_use]
    pub fn cart(&self) -> CartShell {
        CartShell::new(self.clone())
    }

    /// An Apple Pay button for `items`; empty pays for the stored cart.
    #[must_use]
    pub fn apple_pay(&self, items: Vec<ButtonItem>) -> ApplePaySession {
        ApplePaySession::new(self.clone(), items)
    }

    /// A Google Pay button for `items`; empty pays for the stored cart.
    #[must_use]
    pub fn google_pay(&self, items: Vec<ButtonItem>) -> GooglePayAdapter {
        GooglePayAdapter::new(self.clone(), items)
    }
}
