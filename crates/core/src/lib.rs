//! TeeRex Core - Shared types library.
//!
//! This crate provides the domain types used across all TeeRex components:
//! - `storefront` - Catalogue browsing, cart and checkout state
//! - `integration-tests` - End-to-end flows over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, cart entries, money and filter selections

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
