//! Checkout validation and confirmation.
//!
//! ```text
//! Active -> Validating -> Rejected(reason)
//!                      -> Confirmed
//! ```
//!
//! A rejection leaves the cart untouched and the shopper may submit again
//! right away. Confirmation empties the cart and every derived key.

use core::fmt;

use teerex_core::CartEntry;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::store::{KeyValueStore, SessionStore, StoreError};

/// Minimum delivery address length, in characters.
pub const DEFAULT_MIN_ADDRESS_LEN: usize = 20;

/// Why a checkout was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyCart,
    MissingAddress,
    AddressTooShort {
        /// Required length.
        min: usize,
        /// Length given.
        actual: usize,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCart => f.write_str("empty cart"),
            Self::MissingAddress => f.write_str("missing address"),
            Self::AddressTooShort { .. } => f.write_str("address too short"),
        }
    }
}

/// Where the checkout flow stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Active,
    Validating,
    Rejected(RejectReason),
    Confirmed,
}

/// Check the checkout preconditions, in order.
///
/// The address is trimmed before measuring; a blank address counts as
/// missing. Length is counted in characters, not bytes.
///
/// # Errors
///
/// Returns the first failed precondition.
pub fn validate(
    entries: &[CartEntry],
    address: Option<&str>,
    min_address_len: usize,
) -> Result<(), RejectReason> {
    if entries.is_empty() {
        return Err(RejectReason::EmptyCart);
    }

    let address = address.map(str::trim).unwrap_or_default();
    if address.is_empty() {
        return Err(RejectReason::MissingAddress);
    }

    let actual = address.chars().count();
    if actual < min_address_len {
        return Err(RejectReason::AddressTooShort {
            min: min_address_len,
            actual,
        });
    }

    Ok(())
}

/// Runs the checkout state machine against the stored cart.
pub struct Checkout<S> {
    store: SessionStore<S>,
    min_address_len: usize,
    state: watch::Sender<CheckoutState>,
}

impl<S: KeyValueStore> Checkout<S> {
    /// Create a checkout over `store`.
    #[must_use]
    pub fn new(store: SessionStore<S>, min_address_len: usize) -> Self {
        let (state, _) = watch::channel(CheckoutState::Active);
        Self {
            store,
            min_address_len,
            state,
        }
    }

    /// Validate the stored cart and `address`; on success, reset the session.
    ///
    /// Returns the resulting state, either `Rejected` or `Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the confirmed reset cannot be persisted. The state
    /// then stays `Validating` so nothing claims the order went through.
    #[instrument(skip(self, address))]
    pub fn submit(&self, address: Option<&str>) -> Result<CheckoutState, StoreError> {
        self.state.send_replace(CheckoutState::Validating);

        let entries = self.store.cart();
        let next = match validate(&entries, address, self.min_address_len) {
            Ok(()) => {
                self.store.reset_session_state()?;
                info!(lines = entries.len(), "Order confirmed");
                CheckoutState::Confirmed
            }
            Err(reason) => {
                warn!(%reason, "Checkout rejected");
                CheckoutState::Rejected(reason)
            }
        };

        self.state.send_replace(next);
        Ok(next)
    }

    /// Return to `Active`, e.g. when the shopper goes back to browsing.
    pub fn restart(&self) {
        self.state.send_replace(CheckoutState::Active);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.state.borrow()
    }

    /// Receive every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }
}
