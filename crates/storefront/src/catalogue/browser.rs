//! Derived product list for the catalogue page.
//!
//! The displayed list is always recomputed in full from the stored catalogue
//! snapshot, the cached search result and the checked filters: the search
//! result (or the catalogue, with no search in effect) narrowed by the
//! selection. Observers get
//! the whole new [`ProductsView`] on every change; there are no diffs.

use teerex_core::{FilterDimension, FilterSelection, Product};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use super::filter::{self, Facets};
use super::CatalogueSupplier;
use crate::error::Result;
use crate::store::{KeyValueStore, SessionStore};

/// Progress of the one catalogue fetch per page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// The fetch has not completed yet.
    #[default]
    Loading,
    /// The catalogue snapshot is available.
    Ready,
    /// The fetch failed. The message is shown in place of the page.
    Failed(String),
}

/// Everything the catalogue page renders.
///
/// `products` is always the search result (or the whole catalogue when no
/// search is in effect) narrowed by `selection`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsView {
    pub load_state: LoadState,
    /// Products currently displayed.
    pub products: Vec<Product>,
    /// Trimmed search text in effect, if any. A search with no hits still
    /// counts.
    pub search: Option<String>,
    /// "Currently showing" label: the upper-cased search text, if any.
    pub label: Option<String>,
    pub filters_open: bool,
    pub selection: FilterSelection,
    /// Checkbox values derived from the list filters narrow.
    pub facets: Facets,
}

/// Keeps the displayed product list in step with search and filter input.
pub struct CatalogueBrowser<S> {
    store: SessionStore<S>,
    view: watch::Sender<ProductsView>,
}

impl<S: KeyValueStore> CatalogueBrowser<S> {
    /// Create a browser over `store`. Nothing is displayed until [`load`](Self::load).
    #[must_use]
    pub fn new(store: SessionStore<S>) -> Self {
        let (view, _) = watch::channel(ProductsView::default());
        Self { store, view }
    }

    /// Seed the store, fetch the catalogue and display all of it.
    ///
    /// Search and filter state left over from an earlier page view is
    /// cleared. On failure the view switches to [`LoadState::Failed`] with
    /// the error message and displays nothing. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or a store error if the snapshot cannot be
    /// persisted.
    #[instrument(skip(self, supplier))]
    pub async fn load<C: CatalogueSupplier>(&self, supplier: &C) -> Result<()> {
        self.store.initialize()?;
        self.view.send_modify(|view| view.load_state = LoadState::Loading);

        let products = match supplier.fetch().await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Catalogue fetch failed");
                self.view.send_replace(ProductsView {
                    load_state: LoadState::Failed(e.to_string()),
                    ..ProductsView::default()
                });
                return Err(e.into());
            }
        };

        self.store.set_catalogue(&products)?;
        self.clear_search_and_filters()?;
        info!(count = products.len(), "Catalogue loaded");

        self.publish(ProductsView {
            load_state: LoadState::Ready,
            products,
            ..ProductsView::default()
        });
        Ok(())
    }

    /// Narrow the catalogue by name and cache the result.
    ///
    /// The checked filters still apply to the new result. Closes the filter
    /// panel and labels the view with the search text. Blank text ends the
    /// search.
    ///
    /// # Errors
    ///
    /// Returns an error if the search result cannot be persisted.
    #[instrument(skip(self))]
    pub fn search(&self, text: &str) -> Result<()> {
        let text = text.trim();
        let search = (!text.is_empty()).then(|| text.to_string());

        let results = if search.is_some() {
            filter::search(&self.store.catalogue(), text)
        } else {
            Vec::new()
        };
        self.store.set_search_results(&results)?;
        debug!(count = results.len(), "Search applied");

        let selection = self.store.filters();
        let current = self.view.borrow().clone();
        self.publish(ProductsView {
            products: filter::apply(&self.filter_base(search.is_some()), &selection),
            label: search.as_ref().map(|text| text.to_uppercase()),
            search,
            filters_open: false,
            selection,
            ..current
        });
        Ok(())
    }

    /// Check or uncheck one filter value and redisplay.
    ///
    /// Filtering starts from the cached search result while a search is in
    /// effect, even an empty one, otherwise from the whole catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    #[instrument(skip(self))]
    pub fn toggle_filter(&self, dimension: FilterDimension, value: &str) -> Result<()> {
        let mut selection = self.store.filters();
        selection.toggle(dimension, value);
        self.store.set_filters(&selection)?;

        let current = self.view.borrow().clone();
        let products = filter::apply(&self.filter_base(current.search.is_some()), &selection);
        debug!(count = products.len(), "Filters applied");

        self.publish(ProductsView {
            products,
            selection,
            ..current
        });
        Ok(())
    }

    /// Open or close the filter panel.
    ///
    /// Opening starts from a clean selection. Closing ends any search, drops
    /// the label and shows the whole catalogue again.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset state cannot be persisted.
    #[instrument(skip(self))]
    pub fn toggle_filter_panel(&self) -> Result<()> {
        let current = self.view.borrow().clone();

        if current.filters_open {
            self.clear_search_and_filters()?;
            self.publish(ProductsView {
                load_state: current.load_state,
                products: self.store.catalogue(),
                ..ProductsView::default()
            });
        } else {
            let selection = FilterSelection::default();
            self.store.set_filters(&selection)?;
            self.publish(ProductsView {
                products: self.filter_base(current.search.is_some()),
                filters_open: true,
                selection,
                ..current
            });
        }
        Ok(())
    }

    /// Show the whole catalogue with no search, no selection and the panel
    /// closed. Used after the session state was reset elsewhere.
    pub fn reset(&self) {
        let load_state = self.view.borrow().load_state.clone();
        let selection = self.store.filters();
        self.publish(ProductsView {
            load_state,
            products: filter::apply(&self.store.catalogue(), &selection),
            selection,
            ..ProductsView::default()
        });
    }

    fn clear_search_and_filters(&self) -> Result<()> {
        self.store.set_search_results(&[])?;
        self.store.set_filters(&FilterSelection::default())?;
        Ok(())
    }

    fn filter_base(&self, searching: bool) -> Vec<Product> {
        if searching {
            self.store.search_results()
        } else {
            self.store.catalogue()
        }
    }

    fn publish(&self, mut view: ProductsView) {
        view.facets = Facets::from_products(&self.filter_base(view.search.is_some()));
        self.view.send_replace(view);
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// A copy of the current view.
    #[must_use]
    pub fn view(&self) -> ProductsView {
        self.view.borrow().clone()
    }

    /// Products currently displayed.
    #[must_use]
    pub fn displayed(&self) -> Vec<Product> {
        self.view.borrow().products.clone()
    }

    /// Current "currently showing" label.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.view.borrow().label.clone()
    }

    /// Progress of the catalogue fetch.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.view.borrow().load_state.clone()
    }

    /// Checkbox values for the filter panel.
    #[must_use]
    pub fn facets(&self) -> Facets {
        self.view.borrow().facets.clone()
    }

    /// Whether the filter panel is open.
    #[must_use]
    pub fn is_filter_panel_open(&self) -> bool {
        self.view.borrow().filters_open
    }

    /// Receive every recomputed view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProductsView> {
        self.view.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use teerex_core::ProductId;

    use super::*;
    use crate::catalogue::{CatalogueError, StaticCatalogue};
    use crate::error::StorefrontError;
    use crate::store::MemoryStore;

    const CATALOGUE: &str = r#"[
        {"id":1,"name":"Black Polo","price":250,"currency":"INR","imageURL":"","quantity":3,"gender":"Men","color":"Black","type":"Polo"},
        {"id":2,"name":"Blue Hoodie","price":500,"currency":"INR","imageURL":"","quantity":1,"gender":"Women","color":"Blue","type":"Hoodie"},
        {"id":3,"name":"Black Hoodie","price":450,"currency":"INR","imageURL":"","quantity":2,"gender":"Men","color":"Black","type":"Hoodie"}
    ]"#;

    struct FailingCatalogue;

    impl CatalogueSupplier for FailingCatalogue {
        async fn fetch(&self) -> std::result::Result<Vec<Product>, CatalogueError> {
            Err(CatalogueError::Status(503))
        }
    }

    async fn loaded() -> CatalogueBrowser<MemoryStore> {
        let browser = CatalogueBrowser::new(SessionStore::new(MemoryStore::new()));
        browser
            .load(&StaticCatalogue::from_json(CATALOGUE).unwrap())
            .await
            .unwrap();
        browser
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[tokio::test]
    async fn test_load_displays_everything() {
        let browser = loaded().await;
        assert_eq!(browser.load_state(), LoadState::Ready);
        assert_eq!(ids(&browser.displayed()), vec![1, 2, 3]);
        assert_eq!(browser.label(), None);
        assert_eq!(browser.facets().gender, vec!["Men", "Women"]);
    }

    #[tokio::test]
    async fn test_load_failure_blocks_page() {
        let browser = CatalogueBrowser::new(SessionStore::new(MemoryStore::new()));
        let err = browser.load(&FailingCatalogue).await.unwrap_err();

        assert!(matches!(err, StorefrontError::Catalogue(_)));
        assert_eq!(
            browser.load_state(),
            LoadState::Failed("Request failed with status code 503".to_string())
        );
        assert!(browser.displayed().is_empty());
    }

    #[tokio::test]
    async fn test_search_labels_and_caches() {
        let browser = loaded().await;
        browser.search("  hoodie ").unwrap();

        assert_eq!(ids(&browser.displayed()), vec![2, 3]);
        assert_eq!(browser.label().as_deref(), Some("HOODIE"));

        browser.search("").unwrap();
        assert_eq!(ids(&browser.displayed()), vec![1, 2, 3]);
        assert_eq!(browser.label(), None);
    }

    #[tokio::test]
    async fn test_filters_start_from_search_result() {
        let browser = loaded().await;
        browser.search("black").unwrap();
        browser.toggle_filter_panel().unwrap();
        browser
            .toggle_filter(FilterDimension::Type, "Hoodie")
            .unwrap();

        assert_eq!(ids(&browser.displayed()), vec![3]);
        assert_eq!(browser.facets().color, vec!["Black"]);
    }

    #[tokio::test]
    async fn test_filter_after_search_without_hits_shows_nothing() {
        let browser = loaded().await;
        browser.search("sweater").unwrap();
        assert!(browser.displayed().is_empty());

        browser.toggle_filter_panel().unwrap();
        browser.toggle_filter(FilterDimension::Gender, "Men").unwrap();

        let view = browser.view();
        assert!(view.products.is_empty());
        assert_eq!(view.label.as_deref(), Some("SWEATER"));
        assert_eq!(view.search.as_deref(), Some("sweater"));
        assert!(view.facets.gender.is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_checked_filters_applied() {
        let browser = loaded().await;
        browser.toggle_filter(FilterDimension::Color, "Black").unwrap();
        browser.search("hoodie").unwrap();

        let view = browser.view();
        assert_eq!(view.selection.color, vec!["Black"]);
        assert_eq!(ids(&view.products), vec![3]);
        assert_eq!(view.facets.color, vec!["Blue", "Black"]);

        // Blank text ends the search; the selection still narrows
        browser.search("  ").unwrap();
        let view = browser.view();
        assert_eq!(view.search, None);
        assert_eq!(ids(&view.products), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_closing_panel_ends_search() {
        let browser = loaded().await;
        browser.search("hoodie").unwrap();
        browser.toggle_filter_panel().unwrap();
        browser.toggle_filter_panel().unwrap();

        assert_eq!(ids(&browser.displayed()), vec![1, 2, 3]);
        assert!(browser.store.search_results().is_empty());
        assert!(browser.store.filters().is_empty());

        browser.toggle_filter_panel().unwrap();
        browser.toggle_filter(FilterDimension::Gender, "Men").unwrap();
        assert_eq!(ids(&browser.displayed()), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_load_clears_earlier_search_and_filters() {
        let store = SessionStore::new(MemoryStore::new());
        let supplier = StaticCatalogue::from_json(CATALOGUE).unwrap();

        let first = CatalogueBrowser::new(store.clone());
        first.load(&supplier).await.unwrap();
        first.search("polo").unwrap();
        first.toggle_filter(FilterDimension::Color, "Black").unwrap();

        let second = CatalogueBrowser::new(store.clone());
        second.load(&supplier).await.unwrap();
        let view = second.view();
        assert_eq!(ids(&view.products), vec![1, 2, 3]);
        assert!(view.selection.is_empty());
        assert!(store.search_results().is_empty());

        second.toggle_filter(FilterDimension::Type, "Hoodie").unwrap();
        assert_eq!(ids(&second.displayed()), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_base() {
        let browser = loaded().await;
        browser.toggle_filter_panel().unwrap();
        browser.toggle_filter(FilterDimension::Gender, "Men").unwrap();
        assert_eq!(ids(&browser.displayed()), vec![1, 3]);

        browser.toggle_filter(FilterDimension::Gender, "Men").unwrap();
        assert_eq!(ids(&browser.displayed()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_panel_open_resets_and_close_restores() {
        let browser = loaded().await;
        browser.toggle_filter_panel().unwrap();
        assert!(browser.is_filter_panel_open());
        browser.toggle_filter(FilterDimension::Color, "Blue").unwrap();
        browser.search("polo").unwrap();
        assert!(!browser.is_filter_panel_open());

        browser.toggle_filter_panel().unwrap();
        assert!(browser.view().selection.is_empty());

        browser.toggle_filter_panel().unwrap();
        assert!(!browser.is_filter_panel_open());
        assert_eq!(browser.label(), None);
        assert_eq!(ids(&browser.displayed()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reset_after_session_reset() {
        let browser = loaded().await;
        browser.search("polo").unwrap();
        browser.store.reset_session_state().unwrap();

        browser.reset();
        let view = browser.view();
        assert_eq!(view.load_state, LoadState::Ready);
        assert_eq!(ids(&view.products), vec![1, 2, 3]);
        assert_eq!(view.label, None);
        assert!(view.selection.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_full_views() {
        let browser = loaded().await;
        let mut rx = browser.subscribe();

        browser.toggle_filter(FilterDimension::Price, "0-250").unwrap();
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].id, ProductId::new(1));
        assert_eq!(view.selection.price, vec!["0-250"]);
    }
}
