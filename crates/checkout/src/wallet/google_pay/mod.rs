//! Google Pay button adapter.
//!
//! [`GooglePayAdapter::configuration`] is both the availability probe and
//! the re-pricing entry point. Unlike Apple Pay, a failed re-price while the
//! sheet is open leaves the sheet untouched instead of aborting it.

pub mod mapping;
pub mod types;

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use bitsnap_core::{CountryCode, DeliveryMethodId};

pub use types::{
    Address, DisplayItem, DisplayItemType, IntermediatePaymentData, PaymentData, PaymentDataRequest,
    PaymentDataRequestUpdate, SelectionOptionData, ShippingOptionParameters, TransactionInfo,
};

use super::{
    ButtonItem, OneClickAuthorization, PaymentStatus, PostalAddress, ScheduledRedirect,
    WalletGateway, reference_metadata,
};
use crate::backend::AuthorizationOutcome;
use crate::context::CheckoutContext;
use crate::error::{CheckoutError, add_breadcrumb};
use crate::pricing::QuoteRequest;
use crate::types::GooglePayConfig;

/// Result of a configuration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GooglePayAvailability {
    Available(Box<PaymentDataRequest>),
    Unavailable,
}

impl GooglePayAvailability {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Lifecycle of one Google Pay button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GooglePayState {
    /// Not configured, or Google Pay is unavailable.
    Hidden,
    Ready,
    Authorizing,
    Success,
    Failed,
}

/// Button callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GooglePayEvent {
    /// `onPaymentDataChanged`
    PaymentDataChanged(IntermediatePaymentData),
    /// `onLoadPaymentData`
    LoadPaymentData(Box<PaymentData>),
}

/// What the host must do with the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GooglePayCommand {
    /// Resolve `onPaymentDataChanged` with this update.
    UpdatePaymentData(PaymentDataRequestUpdate),
    /// Report the outcome, then follow `redirect` if present.
    CompletePayment {
        status: PaymentStatus,
        redirect: Option<ScheduledRedirect>,
    },
    /// Nothing to do.
    Ignore,
}

/// One Google Pay button.
#[derive(Debug)]
pub struct GooglePayAdapter {
    context: CheckoutContext,
    items: Vec<ButtonItem>,
    state: GooglePayState,
}

impl GooglePayAdapter {
    /// A button for `items`; an empty list pays for the current cart.
    #[must_use]
    pub fn new(context: CheckoutContext, items: Vec<ButtonItem>) -> Self {
        Self {
            context,
            items,
            state: GooglePayState::Hidden,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GooglePayState {
        self.state
    }

    /// Configure the button with its own items.
    pub async fn mount(&mut self) -> GooglePayAvailability {
        let availability = self.configuration(&self.items).await;
        self.state = if availability.is_available() {
            GooglePayState::Ready
        } else {
            GooglePayState::Hidden
        };
        availability
    }

    /// Build a payment request for the cart.
    ///
    /// Non-empty `items` replace the cart first. Any failure along the way
    /// makes Google Pay unavailable.
    #[instrument(skip(self, items), fields(project_id = %self.context.config().project_id, items = items.len()))]
    pub async fn configuration(&self, items: &[ButtonItem]) -> GooglePayAvailability {
        match self.try_configuration(items).await {
            Ok(Some(request)) => GooglePayAvailability::Available(Box::new(request)),
            Ok(None) => GooglePayAvailability::Unavailable,
            Err(e) => {
                warn!(error = %e, "Cannot configure Google Pay");
                GooglePayAvailability::Unavailable
            }
        }
    }

    async fn try_configuration(
        &self,
        items: &[ButtonItem],
    ) -> Result<Option<PaymentDataRequest>, CheckoutError> {
        let Some(config) = self.gateway_config().await? else {
            return Ok(None);
        };

        if !items.is_empty() {
            let items = items.iter().map(ButtonItem::to_line_item).collect();
            self.context.store().replace_products(items)?;
        }

        let (checkout, products, settlement) = self.context.quote_cart().await?;
        let country = checkout
            .country
            .clone()
            .unwrap_or_else(|| self.context.config().default_country.clone());
        Ok(Some(mapping::payment_request(
            &products,
            &settlement.quote,
            &config,
            checkout.coupon_code.as_deref(),
            &country,
        )))
    }

    /// Gateway configuration, cached in the checkout once available.
    async fn gateway_config(&self) -> Result<Option<GooglePayConfig>, CheckoutError> {
        let store = self.context.store();
        if let Some(cached) = store.get().google_pay_config
            && cached.is_available
        {
            debug!("Using cached Google Pay configuration");
            return Ok(Some(cached));
        }

        let availability = self.context.backend().one_click_availability().await?;
        let config = availability
            .google_pay_config
            .filter(|_| availability.google_pay)
            .unwrap_or_else(GooglePayConfig::unavailable);
        store.set_google_pay_config(config.clone())?;
        Ok(config.is_available.then_some(config))
    }

    /// React to a button callback.
    pub async fn handle(&mut self, event: GooglePayEvent) -> GooglePayCommand {
        match (self.state, event) {
            (
                GooglePayState::Ready | GooglePayState::Failed,
                GooglePayEvent::PaymentDataChanged(data),
            ) => GooglePayCommand::UpdatePaymentData(self.payment_data_changed(&data).await),
            (
                GooglePayState::Ready | GooglePayState::Failed,
                GooglePayEvent::LoadPaymentData(data),
            ) => self.load_payment_data(&data).await,
            (state, event) => {
                debug!(?state, ?event, "Ignoring Google Pay event");
                GooglePayCommand::Ignore
            }
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    async fn payment_data_changed(&self, data: &IntermediatePaymentData) -> PaymentDataRequestUpdate {
        if let Err(e) = self.persist_selection(data) {
            warn!(error = %e, "Cannot persist Google Pay selection");
            return PaymentDataRequestUpdate::default();
        }

        match self.configuration(&[]).await {
            GooglePayAvailability::Available(request) => PaymentDataRequestUpdate {
                new_shipping_option_parameters: request.shipping_option_parameters,
                new_transaction_info: Some(request.transaction_info),
            },
            GooglePayAvailability::Unavailable => PaymentDataRequestUpdate::default(),
        }
    }

    fn persist_selection(&self, data: &IntermediatePaymentData) -> Result<(), CheckoutError> {
        let store = self.context.store();
        if let Some(address) = &data.shipping_address {
            if let Some(postal_code) = &address.postal_code {
                store.set_postal_code(Some(postal_code.clone()))?;
            }
            if let Some(code) = address.country_code.as_deref() {
                match CountryCode::parse(code) {
                    Ok(country) => store.set_country(Some(country))?,
                    Err(e) => debug!(error = %e, "Ignoring shipping country"),
                }
            }
        }
        if let Some(option) = &data.shipping_option_data {
            store.set_delivery_method(Some(DeliveryMethodId::new(option.id.clone())))?;
        }
        Ok(())
    }

    #[instrument(skip(self, data), fields(project_id = %self.context.config().project_id))]
    async fn load_payment_data(&mut self, data: &PaymentData) -> GooglePayCommand {
        self.state = GooglePayState::Authorizing;

        let outcome = match self.authorize(data).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = e.report();
                self.state = GooglePayState::Failed;
                return GooglePayCommand::CompletePayment {
                    status: PaymentStatus::Failure,
                    redirect: None,
                };
            }
        };

        let redirect = outcome.redirect_url.map(|url| ScheduledRedirect {
            url,
            after: Duration::ZERO,
        });

        if !outcome.is_success {
            warn!("Google Pay payment was not authorized");
            self.state = GooglePayState::Failed;
            return GooglePayCommand::CompletePayment {
                status: PaymentStatus::Failure,
                redirect,
            };
        }

        if let Err(e) = self.context.store().clear() {
            let _ = CheckoutError::from(e).report();
        }
        info!("Google Pay payment completed");
        add_breadcrumb("google_pay", "Payment completed", None);
        self.state = GooglePayState::Success;
        GooglePayCommand::CompletePayment {
            status: PaymentStatus::Success,
            redirect,
        }
    }

    async fn authorize(&self, data: &PaymentData) -> Result<AuthorizationOutcome, CheckoutError> {
        let store = self.context.store();
        let checkout = store.get();
        let products = self.context.resolve_products().await;

        let shipping = data.shipping_address.clone().unwrap_or_default();
        let billing = data
            .payment_method_data
            .info
            .as_ref()
            .and_then(|info| info.billing_address.clone())
            .unwrap_or_default();

        let mut order = QuoteRequest::from_checkout(&checkout, &products);
        order.email.clone_from(&data.email);
        order.phone.clone_from(&shipping.phone_number);
        if let Some(option) = &data.shipping_option_data {
            order.delivery_method = Some(DeliveryMethodId::new(option.id.clone()));
        }
        if shipping.postal_code.is_some() {
            order.postal_code.clone_from(&shipping.postal_code);
        }

        let authorization = OneClickAuthorization {
            gateway: WalletGateway::GooglePay,
            payment_data: data.payment_method_data.tokenization_data.token.clone(),
            payment_method: data.payment_method_data.kind.clone(),
            transaction_identifier: String::new(),
            order,
            shipping_address: postal_address(&shipping),
            billing_address: postal_address(&billing),
            metadata: reference_metadata(store.reference()),
        };

        Ok(self
            .context
            .backend()
            .authorize_one_click_payment(&authorization)
            .await?)
    }
}

fn postal_address(address: &Address) -> PostalAddress {
    PostalAddress {
        name: address.name.clone().unwrap_or_default(),
        line1: address.address1.clone().unwrap_or_default(),
        city: address.locality.clone().unwrap_or_default(),
        zip_code: address.postal_code.clone().unwrap_or_default(),
        country: address.country_code.clone().unwrap_or_default(),
    }
}
