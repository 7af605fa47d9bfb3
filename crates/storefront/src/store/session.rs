//! Typed accessor over the raw key-value store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use teerex_core::{CartEntry, FilterSelection, Product};
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError, keys};

/// Typed, shared handle to the shopper's persistent state.
///
/// Cloning is cheap; all clones see the same underlying store. Absent keys
/// read as empty values. Stored JSON that fails to decode is logged and read
/// as empty too, so a damaged store never blocks the page.
pub struct SessionStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a raw store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // Writes are whole-value replacements, so a poisoned lock still
        // guards a consistent map.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.lock().get(key) else {
            return T::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Stored value is malformed, using empty default");
            T::default()
        })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)?;
        self.lock().set(key, encoded)
    }

    /// Raw JSON stored under `key`, for diagnostics.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key)
    }

    /// All keys currently stored.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys()
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// The catalogue snapshot from the last successful fetch.
    #[must_use]
    pub fn catalogue(&self) -> Vec<Product> {
        self.read(keys::CATALOGUE)
    }

    /// Replace the catalogue snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the write.
    pub fn set_catalogue(&self, products: &[Product]) -> Result<(), StoreError> {
        self.write(keys::CATALOGUE, products)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The stored cart.
    ///
    /// Entries with `qty == 0` and repeated ids are dropped on the way in,
    /// keeping the first entry for each id.
    #[must_use]
    pub fn cart(&self) -> Vec<CartEntry> {
        let entries: Vec<CartEntry> = self.read(keys::CART);
        let stored = entries.len();
        let mut seen = HashSet::new();
        let valid: Vec<CartEntry> = entries
            .into_iter()
            .filter(|entry| entry.qty > 0 && seen.insert(entry.id))
            .collect();

        if valid.len() < stored {
            warn!(
                dropped = stored - valid.len(),
                "Dropped invalid stored cart entries"
            );
        }
        valid
    }

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the write.
    pub fn set_cart(&self, entries: &[CartEntry]) -> Result<(), StoreError> {
        self.write(keys::CART, entries)
    }

    // =========================================================================
    // Search and filters
    // =========================================================================

    /// The last search result. Empty when no search narrowed the catalogue.
    #[must_use]
    pub fn search_results(&self) -> Vec<Product> {
        self.read(keys::SEARCH_RESULTS)
    }

    /// Replace the cached search result.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the write.
    pub fn set_search_results(&self, products: &[Product]) -> Result<(), StoreError> {
        self.write(keys::SEARCH_RESULTS, products)
    }

    /// The checked filter values.
    #[must_use]
    pub fn filters(&self) -> FilterSelection {
        self.read(keys::FILTERS)
    }

    /// Replace the checked filter values.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the write.
    pub fn set_filters(&self, selection: &FilterSelection) -> Result<(), StoreError> {
        self.write(keys::FILTERS, selection)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Seed every well-known key with its empty value.
    ///
    /// Does nothing when a cart is already stored, so a cart built on an
    /// earlier page view survives the next page load.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the writes.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if self.lock().get(keys::CART).is_some() {
            debug!("Stored cart found, keeping session state");
            return Ok(());
        }

        self.write(keys::CART, &[] as &[CartEntry])?;
        self.write(keys::CATALOGUE, &[] as &[Product])?;
        self.write(keys::SEARCH_RESULTS, &[] as &[Product])?;
        self.write(keys::FILTERS, &FilterSelection::default())?;
        Ok(())
    }

    /// Empty the cart, search cache and filter selection.
    ///
    /// The catalogue snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the writes.
    pub fn reset_session_state(&self) -> Result<(), StoreError> {
        self.write(keys::CART, &[] as &[CartEntry])?;
        self.write(keys::SEARCH_RESULTS, &[] as &[Product])?;
        self.write(keys::FILTERS, &FilterSelection::default())?;
        Ok(())
    }

    /// Remove every stored key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the change.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.lock().clear()
    }
}
