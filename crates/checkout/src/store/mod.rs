//! Local checkout store.
//!
//! The whole [`Checkout`] lives under one storage key and every mutation is
//! a read-modify-write of that record. Reads never fail: missing, malformed
//! or invalid data yields an empty checkout, and [`CheckoutStore::load`]
//! reports which of those happened.

mod parse;
mod storage;

use std::collections::HashSet;
use std::sync::Arc;

use bitsnap_core::{CountryCode, DeliveryMethodId, LineItemId};
use rand::Rng;
use tracing::debug;

pub use parse::{DefaultReason, Parsed, Validate, parse_or_default};
pub use storage::{CheckoutStorage, FileStorage, MemoryStorage, StorageError};

use crate::types::{CartLineItem, Checkout, GooglePayConfig, NewLineItem};

/// Storage key holding the serialized checkout.
pub const CHECKOUT_KEY: &str = "checkout";

/// Storage key holding the referral reference.
pub const REFERENCE_KEY: &str = "bitsnap-ref";

const LINE_ID_LEN: usize = 8;
const LINE_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl Validate for Checkout {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.products.len());
        for item in &self.products {
            if item.id.is_empty() {
                return Err("line item without id".to_string());
            }
            if item.product_id.is_empty() {
                return Err(format!("line item {} without product id", item.id));
            }
            if item.quantity == 0 {
                return Err(format!("line item {} has quantity 0", item.id));
            }
            if !seen.insert(&item.id) {
                return Err(format!("duplicate line item id {}", item.id));
            }
        }
        Ok(())
    }
}

/// Persisted cart state for one browser-like context.
#[derive(Clone)]
pub struct CheckoutStore {
    storage: Arc<dyn CheckoutStorage>,
    default_country: CountryCode,
}

impl std::fmt::Debug for CheckoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutStore")
            .field("default_country", &self.default_country)
            .finish_non_exhaustive()
    }
}

impl CheckoutStore {
    /// Create a store over a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn CheckoutStorage>, default_country: CountryCode) -> Self {
        Self {
            storage,
            default_country,
        }
    }

    /// Store backed by fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), CountryCode::default())
    }

    // =========================================================================
    // Read / Write
    // =========================================================================

    /// Read the checkout, reporting whether the default was used.
    pub fn load(&self) -> Parsed<Checkout> {
        let parsed = match self.storage.get(CHECKOUT_KEY) {
            Ok(raw) => parse_or_default(raw.as_deref()),
            Err(e) => Parsed::Default {
                reason: DefaultReason::Malformed(e.to_string()),
            },
        };
        if let Parsed::Default { reason } = &parsed
            && *reason != DefaultReason::Missing
        {
            debug!(reason = %reason, "Discarding stored checkout");
        }
        parsed
    }

    /// Read the checkout, defaulting to an empty one.
    #[must_use]
    pub fn get(&self) -> Checkout {
        self.load().into_inner()
    }

    /// Overwrite the stored checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn save(&self, checkout: &Checkout) -> Result<(), StorageError> {
        let json = serde_json::to_string(checkout)?;
        self.storage.set(CHECKOUT_KEY, &json)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Checkout) -> R) -> Result<R, StorageError> {
        let mut checkout = self.get();
        let result = f(&mut checkout);
        self.save(&checkout)?;
        Ok(result)
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Append line items, each under a fresh local id.
    ///
    /// Entries are never merged by product id. Items with quantity 0 are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn add_products(&self, items: Vec<NewLineItem>) -> Result<Vec<LineItemId>, StorageError> {
        self.update(|checkout| {
            let mut added = Vec::with_capacity(items.len());
            for item in items {
                if item.quantity == 0 {
                    debug!(product_id = %item.product_id, "Skipping line item with quantity 0");
                    continue;
                }
                let id = fresh_line_id(&checkout.products);
                checkout.products.push(CartLineItem {
                    id: id.clone(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                    metadata: item.metadata,
                });
                added.push(id);
            }
            added
        })
    }

    /// Remove entries whose local id or product id matches any of `ids`.
    ///
    /// Returns the number of removed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn remove_products(&self, ids: &[&str]) -> Result<usize, StorageError> {
        self.update(|checkout| {
            let before = checkout.products.len();
            checkout.products.retain(|item| {
                !ids.contains(&item.id.as_str()) && !ids.contains(&item.product_id.as_str())
            });
            before - checkout.products.len()
        })
    }

    /// Set the quantity of a line item; zero or less removes it.
    ///
    /// Returns `false` if no line item has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn update_quantity(&self, id: &LineItemId, quantity: i64) -> Result<bool, StorageError> {
        self.update(|checkout| {
            let Some(index) = checkout.products.iter().position(|p| &p.id == id) else {
                return false;
            };
            match u32::try_from(quantity) {
                Ok(q) if q > 0 => checkout.products[index].quantity = q,
                Ok(_) => {
                    checkout.products.remove(index);
                }
                // Negative removes; anything above u32::MAX saturates
                Err(_) if quantity < 0 => {
                    checkout.products.remove(index);
                }
                Err(_) => checkout.products[index].quantity = u32::MAX,
            }
            true
        })
    }

    /// Replace every line item with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn replace_products(&self, items: Vec<NewLineItem>) -> Result<Vec<LineItemId>, StorageError> {
        self.update(|checkout| checkout.products.clear())?;
        self.add_products(items)
    }

    /// Reset the checkout, keeping only the selected country.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let cleared = self.get().cleared();
        self.save(&cleared)
    }

    /// Sum of quantities across line items.
    #[must_use]
    pub fn number_of_items(&self) -> u64 {
        self.get().number_of_items()
    }

    // =========================================================================
    // Selections
    // =========================================================================

    /// Persist the selected country.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_country(&self, country: Option<CountryCode>) -> Result<(), StorageError> {
        self.update(|c| c.country = country)
    }

    /// The selected country, persisting the default when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the default fails.
    pub fn country_or_default(&self) -> Result<CountryCode, StorageError> {
        let mut checkout = self.get();
        if let Some(country) = checkout.country {
            return Ok(country);
        }
        checkout.country = Some(self.default_country.clone());
        self.save(&checkout)?;
        Ok(self.default_country.clone())
    }

    /// Persist the coupon code; blank clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_coupon_code(&self, coupon: Option<String>) -> Result<(), StorageError> {
        self.update(|c| c.coupon_code = non_blank(coupon))
    }

    /// Persist the selected delivery method.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_delivery_method(&self, method: Option<DeliveryMethodId>) -> Result<(), StorageError> {
        self.update(|c| c.selected_delivery_method = method.filter(|m| !m.is_empty()))
    }

    /// Persist the postal code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_postal_code(&self, postal_code: Option<String>) -> Result<(), StorageError> {
        self.update(|c| c.postal_code = non_blank(postal_code))
    }

    /// Persist the contact email as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_email(&self, email: Option<String>) -> Result<(), StorageError> {
        self.update(|c| c.email = non_blank(email))
    }

    /// Cache the Google Pay configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_google_pay_config(&self, config: GooglePayConfig) -> Result<(), StorageError> {
        self.update(|c| c.google_pay_config = Some(config))
    }

    // =========================================================================
    // Referral Reference
    // =========================================================================

    /// The stored referral reference, if any.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        match self.storage.get(REFERENCE_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                debug!(error = %e, "Cannot read referral reference");
                None
            }
        }
    }

    /// Store or clear the referral reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_reference(&self, reference: Option<&str>) -> Result<(), StorageError> {
        match reference.filter(|r| !r.is_empty()) {
            Some(r) => self.storage.set(REFERENCE_KEY, r),
            None => self.storage.remove(REFERENCE_KEY),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Random base36 id not used by any existing line item.
fn fresh_line_id(existing: &[CartLineItem]) -> LineItemId {
    let mut rng = rand::rng();
    loop {
        let id: String = (0..LINE_ID_LEN)
            .map(|_| char::from(LINE_ID_ALPHABET[rng.random_range(0..LINE_ID_ALPHABET.len())]))
            .collect();
        if !existing.iter().any(|item| item.id.as_str() == id) {
            return LineItemId::new(id);
        }
    }
}
