//! # Cart Provider
//!
//! The access point consumers go through to reach the cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Access Guard                                         │
//! │                                                                         │
//! │  CartProvider::new(store)          CartProvider::default()             │
//! │        │                                 │                              │
//! │        ▼                                 ▼                              │
//! │  use_cart() ──► Ok(&CartStore)     use_cart() ──► Err(OutsideProvider) │
//! │                                                                         │
//! │  A missing store is a wiring bug: it fails fast and is never retried.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CartError, CartResult};
use crate::store::CartStore;

/// Optional holder of the application's [`CartStore`].
///
/// Components receive a provider instead of a bare store when they may be
/// constructed before the cart is wired in (tests, previews, early startup).
#[derive(Debug, Clone, Default)]
pub struct CartProvider {
    store: Option<CartStore>,
}

impl CartProvider {
    /// Creates a provider with an active store.
    pub fn new(store: CartStore) -> Self {
        CartProvider { store: Some(store) }
    }

    /// Returns the store, or `OutsideProvider` when none is installed.
    pub fn use_cart(&self) -> CartResult<&CartStore> {
        self.store.as_ref().ok_or(CartError::OutsideProvider)
    }

    /// True when a store is installed.
    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// Removes and returns the store, leaving the provider inactive.
    pub fn take(&mut self) -> Option<CartStore> {
        self.store.take()
    }
}

impl From<CartStore> for CartProvider {
    fn from(store: CartStore) -> Self {
        CartProvider::new(store)
    }
}
