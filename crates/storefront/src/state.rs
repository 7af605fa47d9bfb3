//! Storefront state shared by the page controllers.
//!
//! [`Storefront`] owns one [`SessionStore`] and hands clones of it to the
//! browser, cart and checkout, so every component reads and writes the same
//! typed state. Changes propagate explicitly: after checkout resets the
//! session, the cart and browser views are recomputed here rather than by
//! watching the store.

use teerex_core::{FilterDimension, Product, ProductId};
use tracing::{info, instrument};

use crate::cart::{CartError, CartReconciler, CartSnapshot, Checkout, CheckoutState};
use crate::catalogue::{CatalogueBrowser, CatalogueSupplier, LoadState, ProductsView};
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::notice::{NoticeBoard, NoticeKind};
use crate::store::{AnyStore, KeyValueStore, SessionStore};

/// Notice shown when adding a product that already has a cart entry.
pub const ALREADY_IN_CART_NOTICE: &str =
    "Item is already in cart. Click on Cart to navigate to cart page";

/// Notice shown when incrementing past the stocked quantity.
pub const STOCK_LIMIT_NOTICE: &str =
    "Quantity for selected item limit reached. Do not add more products";

/// Storefront state: catalogue view, cart, checkout and notices.
pub struct Storefront<S> {
    config: StorefrontConfig,
    store: SessionStore<S>,
    browser: CatalogueBrowser<S>,
    cart: CartReconciler<S>,
    checkout: Checkout<S>,
    notices: NoticeBoard,
}

impl Storefront<AnyStore> {
    /// Create a storefront with the store backend `config` selects.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured store file cannot be read.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store = AnyStore::open(config.store_path.as_deref())?;
        Ok(Self::new(config, store))
    }
}

impl<S: KeyValueStore> Storefront<S> {
    /// Create a storefront over `store`.
    #[must_use]
    pub fn new(config: StorefrontConfig, store: S) -> Self {
        Self::with_session(config, SessionStore::new(store))
    }

    /// Create a storefront sharing an existing typed store.
    #[must_use]
    pub fn with_session(config: StorefrontConfig, store: SessionStore<S>) -> Self {
        Self {
            browser: CatalogueBrowser::new(store.clone()),
            cart: CartReconciler::new(store.clone()),
            checkout: Checkout::new(store.clone(), config.min_address_len),
            notices: NoticeBoard::new(config.notice_duration),
            store,
            config,
        }
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// Fetch the catalogue and show all of it.
    ///
    /// A failed fetch leaves the browser in [`LoadState::Failed`], which
    /// replaces the whole page.
    ///
    /// # Errors
    ///
    /// Returns the fetch or store error.
    pub async fn load_catalogue<C: CatalogueSupplier>(&self, supplier: &C) -> Result<()> {
        self.browser.load(supplier).await?;
        // The stored cart may predate this page load.
        self.cart.refresh();
        Ok(())
    }

    /// Search the catalogue by product name.
    ///
    /// # Errors
    ///
    /// Returns an error if the search result cannot be persisted.
    pub fn search(&self, text: &str) -> Result<()> {
        self.browser.search(text)
    }

    /// Check or uncheck a filter value.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn toggle_filter(&self, dimension: FilterDimension, value: &str) -> Result<()> {
        self.browser.toggle_filter(dimension, value)
    }

    /// Open or close the filter panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn toggle_filter_panel(&self) -> Result<()> {
        self.browser.toggle_filter_panel()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add the catalogue product `id` to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an id missing from the
    /// catalogue snapshot, or the refused cart mutation. An "already in
    /// cart" refusal also posts a notice.
    #[instrument(skip(self))]
    pub fn add_to_cart(&self, id: ProductId) -> Result<()> {
        let product = self
            .product(id)
            .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;
        let result = self.cart.add(&product);
        self.notify(result)
    }

    /// Raise an entry's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns the refused cart mutation. A stock-limit refusal also posts a
    /// notice.
    pub fn increment(&self, id: ProductId) -> Result<()> {
        let result = self.cart.increment(id);
        self.notify(result)
    }

    /// Lower an entry's quantity by one, removing it at zero.
    ///
    /// # Errors
    ///
    /// Returns the refused cart mutation.
    pub fn decrement(&self, id: ProductId) -> Result<()> {
        let result = self.cart.decrement(id);
        self.notify(result)
    }

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove(&self, id: ProductId) -> Result<()> {
        let result = self.cart.remove(id);
        self.notify(result)
    }

    fn notify(&self, result: std::result::Result<(), CartError>) -> Result<()> {
        if let Err(e) = &result {
            match e {
                CartError::AlreadyInCart(_) => {
                    self.notices.post(NoticeKind::Warning, ALREADY_IN_CART_NOTICE);
                }
                CartError::AtStockLimit { .. } => {
                    self.notices.post(NoticeKind::Warning, STOCK_LIMIT_NOTICE);
                }
                CartError::NotInCart(_) | CartError::UnknownProduct(_) | CartError::Store(_) => {
                    self.notices.post(NoticeKind::Error, e.to_string());
                }
            }
        }
        result.map_err(Into::into)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submit the order for `address`.
    ///
    /// A rejection posts its reason as a notice and leaves the cart alone.
    /// Confirmation empties the cart, search and filters, and recomputes the
    /// cart and catalogue views.
    ///
    /// # Errors
    ///
    /// Returns an error if the confirmed reset cannot be persisted.
    #[instrument(skip(self, address))]
    pub fn checkout(&self, address: Option<&str>) -> Result<CheckoutState> {
        let state = self.checkout.submit(address)?;
        match state {
            CheckoutState::Rejected(reason) => {
                self.notices.post(NoticeKind::Error, reason.to_string());
            }
            CheckoutState::Confirmed => {
                self.cart.refresh();
                self.browser.reset();
                info!("Checkout complete, session reset");
            }
            CheckoutState::Active | CheckoutState::Validating => {}
        }
        Ok(state)
    }

    /// Leave the confirmation view and start a new order.
    pub fn continue_shopping(&self) {
        self.checkout.restart();
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// Look up a product in the catalogue snapshot.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.store.catalogue().into_iter().find(|p| p.id == id)
    }

    /// Products currently displayed.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.browser.displayed()
    }

    /// Everything the catalogue page renders.
    #[must_use]
    pub fn products_view(&self) -> ProductsView {
        self.browser.view()
    }

    /// Progress of the catalogue fetch.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.browser.load_state()
    }

    /// Current cart with totals.
    #[must_use]
    pub fn cart(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// Current checkout state.
    #[must_use]
    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout.state()
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the typed store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Get a reference to the catalogue browser (for subscriptions).
    #[must_use]
    pub const fn browser(&self) -> &CatalogueBrowser<S> {
        &self.browser
    }

    /// Get a reference to the cart reconciler (for subscriptions).
    #[must_use]
    pub const fn cart_reconciler(&self) -> &CartReconciler<S> {
        &self.cart
    }

    /// Get a reference to the notice board.
    #[must_use]
    pub const fn notices(&self) -> &NoticeBoard {
        &self.notices
    }
}
