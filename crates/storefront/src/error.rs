//! Unified error handling.
//!
//! Provides a unified `StorefrontError` type wrapping each module's error.
//! Fallible storefront operations return `Result<T, StorefrontError>`.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalogue::CatalogueError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Catalogue fetch failed.
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    /// Reading or writing session state failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A cart mutation was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No product with this id in the catalogue snapshot.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorefrontError {
    /// Whether the shopper can recover by simply trying again.
    ///
    /// Refused cart mutations are recoverable; storage and supply failures
    /// are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Cart(
                CartError::AlreadyInCart(_)
                    | CartError::AtStockLimit { .. }
                    | CartError::NotInCart(_)
                    | CartError::UnknownProduct(_)
            ) | Self::NotFound(_)
        )
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
