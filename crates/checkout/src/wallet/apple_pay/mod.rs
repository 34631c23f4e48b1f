//! Apple Pay session state machine.
//!
//! ```text
//! Idle -> ButtonVisible -> SessionStarted -> MerchantValidating
//!      -> MerchantValidated | MerchantAborted
//!      -> AwaitingUserSelections -> PaymentAuthorized -> Success | Failed
//! ```
//!
//! Re-pricing failures abort the session: the native sheet has no way to
//! show a pricing error mid-flow. A failing quote while a coupon is applied
//! is the exception and is reported as an invalid coupon instead.

pub mod mapping;
pub mod types;

use tracing::{debug, info, instrument, warn};

use bitsnap_core::{CountryCode, DeliveryMethodId};

pub use types::{
    ApplePayError, ApplePayErrorCode, ApplePayPaymentRequest, ApplePayUpdate, LineItem,
    LineItemType, Payment, PaymentContact, PaymentToken, ShippingMethod,
};

use super::{
    ButtonItem, OneClickAuthorization, PaymentStatus, PostalAddress, ScheduledRedirect,
    WalletGateway, first_present, join_name, reference_metadata,
};
use crate::context::CheckoutContext;
use crate::error::{CheckoutError, add_breadcrumb};
use crate::pricing::QuoteRequest;

/// Lifecycle of one Apple Pay button and its sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplePayState {
    /// Availability not confirmed yet.
    Idle,
    ButtonVisible,
    SessionStarted,
    MerchantValidating,
    MerchantValidated,
    /// Merchant validation failed; terminal for the session.
    MerchantAborted,
    AwaitingUserSelections,
    PaymentAuthorized,
    Success,
    Failed,
    /// Re-pricing failed and the sheet was aborted.
    Aborted,
    /// The buyer dismissed the sheet.
    Cancelled,
}

/// Native sheet callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplePayEvent {
    /// `onvalidatemerchant`
    ValidateMerchant { validation_url: String },
    /// `onshippingmethodselected`
    ShippingMethodSelected { method: ShippingMethod },
    /// `onshippingcontactselected`
    ShippingContactSelected { contact: PaymentContact },
    /// `oncouponcodechanged`
    CouponCodeChanged { coupon_code: String },
    /// `onpaymentauthorized`
    PaymentAuthorized { payment: Payment },
    /// `oncancel`
    Cancelled,
}

/// What the host must do with the native session.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplePayCommand {
    /// `completeMerchantValidation(session)`
    CompleteMerchantValidation(serde_json::Value),
    /// `abort()`
    Abort,
    /// `completeShippingMethodSelection(update)`
    CompleteShippingMethodSelection(ApplePayUpdate),
    /// `completeShippingContactSelection(update)`
    CompleteShippingContactSelection(ApplePayUpdate),
    /// `completeCouponCodeChange(update)`; `update.errors` flags an invalid coupon.
    CompleteCouponCodeChange(ApplePayUpdate),
    /// `completePayment(status)`, then follow `redirect` if present.
    CompletePayment {
        status: PaymentStatus,
        redirect: Option<ScheduledRedirect>,
    },
    /// Nothing to do.
    Ignore,
}

/// Requests produced when the buyer taps the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    /// Estimate used to construct the native session.
    pub provisional: ApplePayPaymentRequest,
    /// First fully quoted request.
    pub quoted: ApplePayPaymentRequest,
}

/// One Apple Pay button and the session it opens.
#[derive(Debug)]
pub struct ApplePaySession {
    context: CheckoutContext,
    items: Vec<ButtonItem>,
    state: ApplePayState,
    last_request: Option<ApplePayPaymentRequest>,
}

impl ApplePaySession {
    /// A button for `items`; an empty list pays for the current cart.
    #[must_use]
    pub fn new(context: CheckoutContext, items: Vec<ButtonItem>) -> Self {
        Self {
            context,
            items,
            state: ApplePayState::Idle,
            last_request: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ApplePayState {
        self.state
    }

    /// Availability gate, run on every mount.
    ///
    /// The button shows only when the platform exposes Apple Pay and the
    /// backend has it enabled for the project.
    #[instrument(skip(self), fields(project_id = %self.context.config().project_id))]
    pub async fn mount(&mut self, platform_available: bool) -> bool {
        self.state = ApplePayState::Idle;
        if !platform_available {
            return false;
        }

        match self.context.backend().one_click_availability().await {
            Ok(availability) if availability.apple_pay => {
                self.state = ApplePayState::ButtonVisible;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "Cannot check Apple Pay availability");
                false
            }
        }
    }

    /// The estimate for the native session constructor.
    ///
    /// A cart button estimates from the stored cart's resolved products.
    pub async fn provisional_request(&self) -> ApplePayPaymentRequest {
        let country = &self.context.config().default_country;
        if !self.items.is_empty() {
            return mapping::provisional_request(&self.items, country);
        }
        let items: Vec<ButtonItem> = self
            .context
            .resolve_products()
            .await
            .iter()
            .map(ButtonItem::from)
            .collect();
        mapping::provisional_request(&items, country)
    }

    /// Start a session after the buyer tapped the button.
    ///
    /// Seeds the cart with the button's items and fetches the first quote.
    ///
    /// # Errors
    ///
    /// Returns `BadInput("session-not-ready")` unless the button is visible,
    /// or the quote error; the session is not started in that case.
    #[instrument(skip(self), fields(project_id = %self.context.config().project_id))]
    pub async fn begin(&mut self) -> Result<SessionStart, CheckoutError> {
        if !matches!(
            self.state,
            ApplePayState::ButtonVisible
                | ApplePayState::Success
                | ApplePayState::Failed
                | ApplePayState::Aborted
                | ApplePayState::MerchantAborted
                | ApplePayState::Cancelled
        ) {
            return Err(CheckoutError::bad_input("session-not-ready"));
        }

        let provisional = self.provisional_request().await;
        if !self.items.is_empty() {
            let items = self.items.iter().map(ButtonItem::to_line_item).collect();
            self.context.store().replace_products(items)?;
        }

        let quoted = match self.quoted_request().await {
            Ok(request) => request,
            Err(e) => {
                self.state = ApplePayState::ButtonVisible;
                return Err(e.report());
            }
        };

        add_breadcrumb("apple_pay", "Session started", None);
        self.state = ApplePayState::SessionStarted;
        Ok(SessionStart {
            provisional,
            quoted,
        })
    }

    /// React to a native sheet callback.
    pub async fn handle(&mut self, event: ApplePayEvent) -> ApplePayCommand {
        match (self.state, event) {
            (ApplePayState::SessionStarted, ApplePayEvent::ValidateMerchant { validation_url }) => {
                self.validate_merchant(&validation_url).await
            }
            (
                ApplePayState::MerchantValidated | ApplePayState::AwaitingUserSelections,
                ApplePayEvent::ShippingMethodSelected { method },
            ) => self.shipping_method_selected(method).await,
            (
                ApplePayState::MerchantValidated | ApplePayState::AwaitingUserSelections,
                ApplePayEvent::ShippingContactSelected { contact },
            ) => self.shipping_contact_selected(&contact).await,
            (
                ApplePayState::MerchantValidated | ApplePayState::AwaitingUserSelections,
                ApplePayEvent::CouponCodeChanged { coupon_code },
            ) => self.coupon_code_changed(coupon_code).await,
            (
                ApplePayState::MerchantValidated
                | ApplePayState::AwaitingUserSelections
                | ApplePayState::Failed,
                ApplePayEvent::PaymentAuthorized { payment },
            ) => self.payment_authorized(&payment).await,
            (
                ApplePayState::SessionStarted
                | ApplePayState::MerchantValidating
                | ApplePayState::MerchantValidated
                | ApplePayState::AwaitingUserSelections
                | ApplePayState::PaymentAuthorized
                | ApplePayState::Failed,
                ApplePayEvent::Cancelled,
            ) => {
                info!("Apple Pay session cancelled");
                self.state = ApplePayState::Cancelled;
                ApplePayCommand::Ignore
            }
            (state, event) => {
                debug!(?state, ?event, "Ignoring Apple Pay event");
                ApplePayCommand::Ignore
            }
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    async fn validate_merchant(&mut self, validation_url: &str) -> ApplePayCommand {
        self.state = ApplePayState::MerchantValidating;

        let session = match self
            .context
            .backend()
            .validate_apple_pay_merchant(validation_url)
            .await
        {
            Ok(session) if !session.is_empty() => session,
            Ok(_) => {
                warn!("Empty merchant session, aborting");
                self.state = ApplePayState::MerchantAborted;
                return ApplePayCommand::Abort;
            }
            Err(e) => {
                let _ = CheckoutError::from(e).report();
                self.state = ApplePayState::MerchantAborted;
                return ApplePayCommand::Abort;
            }
        };

        match serde_json::from_str(&session) {
            Ok(blob) => {
                self.state = ApplePayState::MerchantValidated;
                ApplePayCommand::CompleteMerchantValidation(blob)
            }
            Err(e) => {
                warn!(error = %e, "Merchant session is not JSON, aborting");
                self.state = ApplePayState::MerchantAborted;
                ApplePayCommand::Abort
            }
        }
    }

    async fn shipping_method_selected(&mut self, method: ShippingMethod) -> ApplePayCommand {
        let persisted = self
            .context
            .store()
            .set_delivery_method(Some(DeliveryMethodId::new(method.identifier)));
        if let Err(e) = persisted {
            return self.abort(e.into());
        }

        match self.quoted_request().await {
            Ok(request) => {
                self.state = ApplePayState::AwaitingUserSelections;
                ApplePayCommand::CompleteShippingMethodSelection(ApplePayUpdate::from_request(&request))
            }
            Err(e) => self.abort(e),
        }
    }

    async fn shipping_contact_selected(&mut self, contact: &PaymentContact) -> ApplePayCommand {
        if let Err(e) = self.persist_contact(contact) {
            return self.abort(e);
        }

        match self.quoted_request().await {
            Ok(request) => {
                self.state = ApplePayState::AwaitingUserSelections;
                ApplePayCommand::CompleteShippingContactSelection(ApplePayUpdate::from_request(&request))
            }
            Err(e) => self.abort(e),
        }
    }

    fn persist_contact(&self, contact: &PaymentContact) -> Result<(), CheckoutError> {
        let store = self.context.store();
        if let Some(code) = contact.country_code.as_deref() {
            match CountryCode::parse(code) {
                Ok(country) => store.set_country(Some(country))?,
                Err(e) => debug!(error = %e, "Ignoring contact country"),
            }
        }
        if let Some(postal_code) = &contact.postal_code {
            store.set_postal_code(Some(postal_code.clone()))?;
        }
        if let Some(email) = &contact.email_address {
            store.set_email(Some(email.clone()))?;
        }
        Ok(())
    }

    async fn coupon_code_changed(&mut self, coupon_code: String) -> ApplePayCommand {
        let store = self.context.store().clone();
        let previous = store.get().coupon_code;
        let coupon = Some(coupon_code).filter(|c| !c.trim().is_empty());
        let has_coupon = coupon.is_some();

        if let Err(e) = store.set_coupon_code(coupon) {
            return self.abort(e.into());
        }

        match self.quoted_request().await {
            Ok(request) => {
                self.state = ApplePayState::AwaitingUserSelections;
                ApplePayCommand::CompleteCouponCodeChange(ApplePayUpdate::from_request(&request))
            }
            Err(e) if has_coupon => {
                debug!(error = %e, "Quote failed with coupon applied, reporting invalid coupon");
                if let Err(e) = store.set_coupon_code(previous) {
                    return self.abort(e.into());
                }
                let Some(last) = &self.last_request else {
                    return self.abort(e);
                };
                let mut update = ApplePayUpdate::from_request(last);
                update.errors.push(ApplePayError {
                    code: ApplePayErrorCode::CouponCodeInvalid,
                    contact_field: None,
                    message: None,
                });
                self.state = ApplePayState::AwaitingUserSelections;
                ApplePayCommand::CompleteCouponCodeChange(update)
            }
            Err(e) => self.abort(e),
        }
    }

    #[instrument(skip(self, payment), fields(project_id = %self.context.config().project_id))]
    async fn payment_authorized(&mut self, payment: &Payment) -> ApplePayCommand {
        self.state = ApplePayState::PaymentAuthorized;

        let outcome = match self.authorize(payment).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = e.report();
                self.state = ApplePayState::Failed;
                return ApplePayCommand::CompletePayment {
                    status: PaymentStatus::Failure,
                    redirect: None,
                };
            }
        };

        // The backend may send the buyer to a failure page as well
        let after = self.context.config().redirect_delay;
        let redirect = outcome
            .redirect_url
            .map(|url| ScheduledRedirect { url, after });

        if !outcome.is_success {
            warn!("Apple Pay payment was not authorized");
            self.state = ApplePayState::Failed;
            return ApplePayCommand::CompletePayment {
                status: PaymentStatus::Failure,
                redirect,
            };
        }

        if let Err(e) = self.context.store().clear() {
            let _ = CheckoutError::from(e).report();
        }
        add_breadcrumb("apple_pay", "Payment completed", None);
        self.state = ApplePayState::Success;

        ApplePayCommand::CompletePayment {
            status: PaymentStatus::Success,
            redirect,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn abort(&mut self, error: CheckoutError) -> ApplePayCommand {
        warn!(error = %error, "Aborting Apple Pay session");
        self.state = ApplePayState::Aborted;
        ApplePayCommand::Abort
    }

    /// Resolve, quote and map the current cart.
    async fn quoted_request(&mut self) -> Result<ApplePayPaymentRequest, CheckoutError> {
        let (checkout, products, settlement) = self.context.quote_cart().await?;
        let country = checkout
            .country
            .clone()
            .unwrap_or_else(|| self.context.config().default_country.clone());
        let request = mapping::payment_request(&products, &settlement.quote, &country);
        self.last_request = Some(request.clone());
        Ok(request)
    }

    async fn authorize(
        &self,
        payment: &Payment,
    ) -> Result<crate::backend::AuthorizationOutcome, CheckoutError> {
        let store = self.context.store();
        let checkout = store.get();
        let products = self.context.resolve_products().await;

        let shipping = payment.shipping_contact.clone().unwrap_or_default();
        let billing = payment.billing_contact.clone().unwrap_or_default();

        let mut order = QuoteRequest::from_checkout(&checkout, &products);
        order.email = first_present(&[
            shipping.email_address.as_deref(),
            billing.email_address.as_deref(),
            checkout.email.as_deref(),
        ]);
        order.phone = first_present(&[
            shipping.phone_number.as_deref(),
            billing.phone_number.as_deref(),
        ]);

        let family_name = shipping
            .family_name
            .as_deref()
            .or(billing.family_name.as_deref());

        let authorization = OneClickAuthorization {
            gateway: WalletGateway::ApplePay,
            payment_data: payment.token.payment_data.to_string(),
            payment_method: payment.token.payment_method.to_string(),
            transaction_identifier: payment.token.transaction_identifier.clone(),
            order,
            shipping_address: PostalAddress {
                name: join_name(&[shipping.given_name.as_deref(), family_name]),
                line1: shipping.first_address_line(),
                city: shipping.locality.clone().unwrap_or_default(),
                zip_code: shipping.postal_code.clone().unwrap_or_default(),
                country: shipping.country_code.clone().unwrap_or_default(),
            },
            billing_address: PostalAddress {
                name: join_name(&[billing.given_name.as_deref(), billing.family_name.as_deref()]),
                line1: billing.first_address_line(),
                city: billing.locality.clone().unwrap_or_default(),
                zip_code: billing.postal_code.clone().unwrap_or_default(),
                country: billing.country_code.clone().unwrap_or_default(),
            },
            metadata: reference_metadata(store.reference()),
        };

        Ok(self
            .context
            .backend()
            .authorize_one_click_payment(&authorization)
            .await?)
    }
}
