//! Core types for TeeRex.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod filter;
pub mod id;
pub mod price;
pub mod product;

pub use cart::CartEntry;
pub use filter::{FilterDimension, FilterSelection, ParseDimensionError};
pub use id::*;
pub use price::{Money, PriceRange, PriceRangeError};
pub use product::Product;
