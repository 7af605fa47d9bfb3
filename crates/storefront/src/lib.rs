//! TeeRex storefront library.
//!
//! Catalogue browsing with search and faceted filters, a stock-aware cart,
//! and address-validated checkout, all backed by one persistent key-value
//! session store. Embedders build a [`Storefront`], load the catalogue once
//! per page load, and subscribe to the watch channels the components expose.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod notice;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use state::Storefront;
