//! Product catalogue: supply, filtering and the browsing view.
//!
//! # Architecture
//!
//! - [`CatalogueSupplier`] produces the full product list. The storefront
//!   fetches it once per page load; there is no paging, retry or backoff.
//! - [`filter`] holds the pure narrowing functions (search text, checked
//!   filter values, facet discovery).
//! - [`CatalogueBrowser`] keeps the derived "currently displayed" list in
//!   step with search and filter changes and persists both through the
//!   [`SessionStore`](crate::store::SessionStore).
//!
//! # Example
//!
//! ```rust,ignore
//! use teerex_storefront::catalogue::{CatalogueSupplier, HttpCatalogue};
//!
//! let supplier = HttpCatalogue::new(&config.catalogue);
//! let products = supplier.fetch().await?;
//! ```

mod browser;
pub mod filter;

pub use browser::{CatalogueBrowser, LoadState, ProductsView};
pub use filter::Facets;

use std::future::Future;

use teerex_core::Product;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::CatalogueConfig;

/// Errors that can occur while fetching the catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request failed with status code {0}")]
    Status(u16),

    /// The body was not a JSON array of products.
    #[error("Malformed catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of the full product list.
pub trait CatalogueSupplier {
    /// Fetch every product. Either the whole list or an error; never a
    /// partial result.
    fn fetch(&self) -> impl Future<Output = Result<Vec<Product>, CatalogueError>> + Send;
}

// =============================================================================
// HttpCatalogue
// =============================================================================

/// Fetches the catalogue with a single GET to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpCatalogue {
    client: reqwest::Client,
    url: Url,
}

impl HttpCatalogue {
    /// Create a supplier for the configured catalogue URL.
    #[must_use]
    pub fn new(config: &CatalogueConfig) -> Self {
        Self::with_url(config.url.clone())
    }

    /// Create a supplier for an explicit URL.
    #[must_use]
    pub fn with_url(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// The URL this supplier reads.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl CatalogueSupplier for HttpCatalogue {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<Product>, CatalogueError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalogue endpoint returned non-success status"
            );
            return Err(CatalogueError::Status(status.as_u16()));
        }

        let products: Vec<Product> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalogue body"
            );
            CatalogueError::Parse(e)
        })?;

        tracing::debug!(count = products.len(), "Catalogue fetched");
        Ok(products)
    }
}

// =============================================================================
// StaticCatalogue
// =============================================================================

/// Serves a fixed product list without any I/O.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogue {
    products: Vec<Product>,
}

impl StaticCatalogue {
    /// Serve `products` on every fetch.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Decode a catalogue from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl CatalogueSupplier for StaticCatalogue {
    async fn fetch(&self) -> Result<Vec<Product>, CatalogueError> {
        Ok(self.products.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_error_display() {
        assert_eq!(
            CatalogueError::Status(404).to_string(),
            "Request failed with status code 404"
        );
    }

    #[test]
    fn test_static_catalogue_rejects_non_array() {
        let err = StaticCatalogue::from_json(r#"{"products": []}"#).unwrap_err();
        assert!(matches!(err, CatalogueError::Parse(_)));
    }

    #[tokio::test]
    async fn test_static_catalogue_fetch() {
        let supplier = StaticCatalogue::from_json(
            r#"[{"id":1,"name":"Red Polo","price":200,"currency":"INR","imageURL":"","quantity":2,"gender":"Men","color":"Red","type":"Polo"}]"#,
        )
        .unwrap();

        let products = supplier.fetch().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Red Polo");
    }

    #[test]
    fn test_http_catalogue_keeps_url() {
        let url = Url::parse("http://127.0.0.1:9/catalogue.json").unwrap();
        let supplier = HttpCatalogue::with_url(url.clone());
        assert_eq!(supplier.url(), &url);
    }
}
