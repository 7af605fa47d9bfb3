//! Cart state reconciliation.
//!
//! The cart is a list of [`CartEntry`] values keyed by product id. Every
//! mutation reads the stored list, applies one change, writes the whole list
//! back and publishes a freshly computed [`CartSnapshot`]. Stock limits come
//! from the stored catalogue snapshot and are checked when incrementing only;
//! adding always starts an entry at quantity 1.

pub mod checkout;

pub use checkout::{Checkout, CheckoutState, RejectReason};

use rust_decimal::Decimal;
use teerex_core::{CartEntry, Money, Product, ProductId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::store::{KeyValueStore, SessionStore, StoreError};

/// Errors raised by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product already has an entry. The stored cart is unchanged.
    #[error("product {0} is already in the cart")]
    AlreadyInCart(ProductId),

    /// The entry already holds every unit in stock.
    #[error("product {id} is at its stock limit of {limit}")]
    AtStockLimit {
        /// Product at its limit.
        id: ProductId,
        /// Units in stock.
        limit: u32,
    },

    /// No entry exists for the product.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The catalogue snapshot has no such product, so its stock is unknown.
    #[error("product {0} is not in the catalogue")]
    UnknownProduct(ProductId),

    /// Persisting the cart failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// The cart and its derived totals at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub entries: Vec<CartEntry>,
    /// Sum of `qty * price` over all entries.
    pub total: Decimal,
    /// Sum of `qty` over all entries.
    pub item_count: u32,
}

impl CartSnapshot {
    /// Compute totals for `entries`.
    #[must_use]
    pub fn new(entries: Vec<CartEntry>) -> Self {
        let total = entries.iter().map(CartEntry::line_total).sum();
        let item_count = entries.iter().map(|e| e.qty).sum();
        Self {
            entries,
            total,
            item_count,
        }
    }

    /// The total in the cart's currency. `None` for an empty cart.
    #[must_use]
    pub fn total_money(&self) -> Option<Money> {
        self.entries
            .first()
            .map(|entry| Money::new(self.total, entry.currency.clone()))
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies cart mutations against the persistent store.
pub struct CartReconciler<S> {
    store: SessionStore<S>,
    snapshot: watch::Sender<CartSnapshot>,
}

impl<S: KeyValueStore> CartReconciler<S> {
    /// Create a reconciler over `store`, starting from the stored cart.
    #[must_use]
    pub fn new(store: SessionStore<S>) -> Self {
        let (snapshot, _) = watch::channel(CartSnapshot::new(store.cart()));
        Self { store, snapshot }
    }

    fn commit(&self, entries: Vec<CartEntry>) -> Result<(), CartError> {
        self.store.set_cart(&entries)?;
        self.snapshot.send_replace(CartSnapshot::new(entries));
        Ok(())
    }

    /// Add `product` with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AlreadyInCart`] if the product has an entry; the
    /// stored cart is left as is.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: &Product) -> Result<(), CartError> {
        let mut entries = self.store.cart();
        if entries.iter().any(|entry| entry.id == product.id) {
            return Err(CartError::AlreadyInCart(product.id));
        }

        entries.push(CartEntry::from_product(product));
        self.commit(entries)?;
        debug!("Added to cart");
        Ok(())
    }

    /// Raise an entry's quantity by one, up to the product's stock.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AtStockLimit`] when the entry already holds all
    /// stocked units, [`CartError::NotInCart`] or
    /// [`CartError::UnknownProduct`] when the id cannot be resolved.
    #[instrument(skip(self))]
    pub fn increment(&self, id: ProductId) -> Result<(), CartError> {
        let mut entries = self.store.cart();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(CartError::NotInCart(id))?;

        let limit = self
            .store
            .catalogue()
            .iter()
            .find(|product| product.id == id)
            .map(|product| product.quantity)
            .ok_or(CartError::UnknownProduct(id))?;

        if entry.qty >= limit {
            return Err(CartError::AtStockLimit { id, limit });
        }

        entry.qty += 1;
        debug!(qty = entry.qty, "Incremented");
        self.commit(entries)
    }

    /// Lower an entry's quantity by one, removing it when it would reach 0.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if there is no entry for `id`.
    #[instrument(skip(self))]
    pub fn decrement(&self, id: ProductId) -> Result<(), CartError> {
        let mut entries = self.store.cart();
        let pos = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(CartError::NotInCart(id))?;

        if let Some(entry) = entries.get_mut(pos)
            && entry.qty > 1
        {
            entry.qty -= 1;
            debug!(qty = entry.qty, "Decremented");
        } else {
            entries.remove(pos);
            debug!("Decremented to zero, removed");
        }

        self.commit(entries)
    }

    /// Delete the entry for `id`. Deleting an absent entry is a no-op write.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove(&self, id: ProductId) -> Result<(), CartError> {
        let mut entries = self.store.cart();
        entries.retain(|entry| entry.id != id);
        self.commit(entries)
    }

    /// Re-read the stored cart and publish it.
    ///
    /// Used after another component wrote the cart key (checkout reset).
    pub fn refresh(&self) {
        self.snapshot
            .send_replace(CartSnapshot::new(self.store.cart()));
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// Current cart entries.
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.snapshot.borrow().entries.clone()
    }

    /// Current cart with totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Sum of `qty * price`; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.snapshot.borrow().total
    }

    /// Total units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.snapshot.borrow().item_count
    }

    /// Receive every recomputed snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};

    fn product(id: i32, price: i64, quantity: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Tee {id}"),
            price: Decimal::from(price),
            currency: "INR".to_string(),
            image_url: format!("{id}.png"),
            quantity,
            gender: "Men".to_string(),
            color: "Black".to_string(),
            kind: "Polo".to_string(),
        }
    }

    fn reconciler(catalogue: &[Product]) -> CartReconciler<MemoryStore> {
        let store = SessionStore::new(MemoryStore::new());
        store.set_catalogue(catalogue).unwrap();
        CartReconciler::new(store)
    }

    fn qty(cart: &CartReconciler<MemoryStore>, id: i32) -> Option<u32> {
        cart.entries()
            .iter()
            .find(|e| e.id == ProductId::new(id))
            .map(|e| e.qty)
    }

    #[test]
    fn test_add_creates_entry_with_qty_one() {
        let items = [product(1, 200, 2)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();

        assert_eq!(qty(&cart, 1), Some(1));
        assert_eq!(cart.entries()[0].name, "Tee 1");
    }

    #[test]
    fn test_add_twice_keeps_single_entry() {
        let items = [product(1, 200, 5)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        cart.increment(ProductId::new(1)).unwrap();

        let err = cart.add(&items[0]).unwrap_err();
        assert!(matches!(err, CartError::AlreadyInCart(id) if id == ProductId::new(1)));
        assert_eq!(cart.entries().len(), 1);
        assert_eq!(qty(&cart, 1), Some(2));
    }

    #[test]
    fn test_add_ignores_stock() {
        let items = [product(1, 200, 0)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        assert_eq!(qty(&cart, 1), Some(1));
    }

    #[test]
    fn test_increment_stops_at_stock_limit() {
        let items = [product(1, 200, 2)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        cart.increment(ProductId::new(1)).unwrap();

        let err = cart.increment(ProductId::new(1)).unwrap_err();
        assert!(matches!(err, CartError::AtStockLimit { limit: 2, .. }));
        assert_eq!(qty(&cart, 1), Some(2));
    }

    #[test]
    fn test_increment_then_decrement_restores_qty() {
        let items = [product(1, 200, 5)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        cart.increment(ProductId::new(1)).unwrap();

        cart.increment(ProductId::new(1)).unwrap();
        cart.decrement(ProductId::new(1)).unwrap();
        assert_eq!(qty(&cart, 1), Some(2));
    }

    #[test]
    fn test_increment_unresolvable_ids() {
        let items = [product(1, 200, 5)];
        let cart = reconciler(&items);
        assert!(matches!(
            cart.increment(ProductId::new(1)),
            Err(CartError::NotInCart(_))
        ));

        cart.add(&product(9, 100, 3)).unwrap();
        assert!(matches!(
            cart.increment(ProductId::new(9)),
            Err(CartError::UnknownProduct(_))
        ));
    }

    #[test]
    fn test_decrement_at_one_removes_entry() {
        let items = [product(1, 200, 5), product(2, 50, 5)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        cart.add(&items[1]).unwrap();

        cart.decrement(ProductId::new(1)).unwrap();
        assert_eq!(qty(&cart, 1), None);
        assert_eq!(cart.entries().len(), 1);
        assert!(matches!(
            cart.decrement(ProductId::new(1)),
            Err(CartError::NotInCart(_))
        ));
    }

    #[test]
    fn test_remove_is_unconditional() {
        let items = [product(1, 200, 5)];
        let cart = reconciler(&items);
        cart.add(&items[0]).unwrap();
        cart.increment(ProductId::new(1)).unwrap();

        cart.remove(ProductId::new(1)).unwrap();
        assert!(cart.entries().is_empty());
        cart.remove(ProductId::new(1)).unwrap();
    }

    #[test]
    fn test_total() {
        let items = [product(1, 100, 5), product(2, 50, 5)];
        let cart = reconciler(&items);
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.add(&items[0]).unwrap();
        cart.increment(ProductId::new(1)).unwrap();
        cart.add(&items[1]).unwrap();

        assert_eq!(cart.total(), Decimal::from(250));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(
            cart.snapshot().total_money().unwrap().to_string(),
            "INR 250"
        );
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let items = [product(1, 100, 5)];
        let store = SessionStore::new(MemoryStore::new());
        store.set_catalogue(&items).unwrap();
        let cart = CartReconciler::new(store.clone());

        cart.add(&items[0]).unwrap();
        assert_eq!(store.cart(), cart.entries());
        cart.increment(ProductId::new(1)).unwrap();
        assert_eq!(store.cart()[0].qty, 2);
        cart.decrement(ProductId::new(1)).unwrap();
        assert_eq!(store.cart()[0].qty, 1);
        cart.remove(ProductId::new(1)).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_starts_from_stored_cart_and_refreshes() {
        let items = [product(1, 100, 5)];
        let store = SessionStore::new(MemoryStore::new());
        store.set_catalogue(&items).unwrap();
        store
            .set_cart(&[CartEntry::from_product(&items[0])])
            .unwrap();

        let cart = CartReconciler::new(store.clone());
        assert_eq!(cart.entries().len(), 1);

        store.reset_session_state().unwrap();
        let mut rx = cart.subscribe();
        cart.refresh();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_failed_write_does_not_count_as_added() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("session");
        let items = [product(1, 200, 2)];

        let store = SessionStore::new(FileStore::open(parent.join("store.json")).unwrap());
        store.set_catalogue(&items).unwrap();
        let cart = CartReconciler::new(store);

        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "").unwrap();
        assert!(matches!(cart.add(&items[0]), Err(CartError::Store(_))));
        assert!(cart.entries().is_empty());

        std::fs::remove_file(&parent).unwrap();
        cart.add(&items[0]).unwrap();
        assert_eq!(cart.item_count(), 1);
    }
}
