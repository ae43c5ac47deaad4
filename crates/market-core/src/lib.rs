//! # market-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the cart's data model and every list transformation
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GoMarketplace Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI / application layer                       │   │
//! │  │    products ──► addToCart ──► increment ──► decrement           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartStore handle                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    market-cart (CartStore)                      │   │
//! │  │    locking, publication, hydration, writer queue                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   cart    │  │ validation│                  │   │
//! │  │   │ LineItem  │  │   Cart    │  │ snapshot  │                  │   │
//! │  │   │AddRequest │  │ transforms│  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `LineItem` and `AddRequest`
//! - [`cart`] - The `Cart` list and its mutation rules
//! - [`error`] - Domain error types
//! - [`validation`] - Invariant checks for stored snapshots
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::{AddRequest, Cart};
//!
//! let mut cart = Cart::new();
//! cart.add_item(&AddRequest::new("1", "Coffee mug", "https://img/mug.png", 10.0));
//! cart.add_item(&AddRequest::new("1", "Coffee mug", "https://img/mug.png", 10.0));
//!
//! assert_eq!(cart.items()[0].quantity, 2);
//!
//! cart.decrement("1");
//! cart.decrement("1");
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{AddRequest, LineItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot lives under.
///
/// Namespaced by application so several apps can share one key-value store.
pub const CART_STORAGE_KEY: &str = "@GoMarketplace:products";

/// Smallest quantity a line item may hold.
///
/// A decrement that would go below this removes the item instead.
pub const MIN_ITEM_QUANTITY: u32 = 1;
