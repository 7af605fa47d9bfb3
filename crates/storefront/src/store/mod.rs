//! Persistent key-value storage behind the storefront state.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the raw string store: synchronous `get`/`set`/
//!   `clear`/`keys` scoped to one shopper. It knows nothing about products.
//! - [`SessionStore`] is the only typed accessor. Every read and write of
//!   the catalogue snapshot, cart, search cache and filter selection goes
//!   through it; callers never touch raw keys.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map, used by tests and single-page embeds.
//! - [`FileStore`]: one JSON object file, written through on every mutation.

mod file;
mod memory;
mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionStore;

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("store encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A synchronous string-keyed store.
///
/// Absent keys read as `None`. Values are JSON text; decoding is the job of
/// [`SessionStore`].
pub trait KeyValueStore: Send {
    /// Read the value under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the write.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the change.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// All keys currently present.
    fn keys(&self) -> Vec<String>;
}

/// Well-known storage keys.
pub mod keys {
    /// Key for the catalogue snapshot fetched at page load.
    pub const CATALOGUE: &str = "allProducts";

    /// Key for the cart entry list.
    pub const CART: &str = "cartItems";

    /// Key for the last search result.
    pub const SEARCH_RESULTS: &str = "searchedProductsByUser";

    /// Key for the checked filter values.
    pub const FILTERS: &str = "appliedFilters";
}

/// The backend chosen by configuration.
#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl AnyStore {
    /// Open a [`FileStore`] at `path`, or a fresh [`MemoryStore`] without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: Option<&std::path::Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Ok(Self::File(FileStore::open(path)?)),
            None => Ok(Self::Memory(MemoryStore::new())),
        }
    }
}

impl KeyValueStore for AnyStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::File(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set(key, value),
            Self::File(store) => store.set(key, value),
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.clear(),
            Self::File(store) => store.clear(),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Self::Memory(store) => store.keys(),
            Self::File(store) => store.keys(),
        }
    }
}
