//! # market-cart: Cart State for GoMarketplace
//!
//! Holds the shopping cart in memory and keeps it mirrored to local
//! key-value storage after every change.
//!
//! ## Component Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    market-cart Components                               │
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────────────────────────────────┐    │
//! │  │ CartProvider │─────►│              CartStore                   │    │
//! │  │ (use_cart)   │      │                                          │    │
//! │  └──────────────┘      │  Mutex<State> ── watch<CartSnapshot> ──► │ UI │
//! │                        │       │                                  │    │
//! │                        │       └── mpsc<WriteRequest>             │    │
//! │                        └───────────────┬──────────────────────────┘    │
//! │                                        ▼                                │
//! │                        ┌──────────────────────────────────────────┐    │
//! │                        │  SnapshotWriter task ──► KeyValueStore   │    │
//! │                        └──────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - `CartStore`, hydration, publication
//! - [`writer`] - Background snapshot writer and `PersistStatus`
//! - [`provider`] - `CartProvider` access guard
//! - [`config`] - `CartConfig` loading
//! - [`error`] - `CartError`

pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod writer;

pub use config::CartConfig;
pub use error::{CartError, CartResult};
pub use provider::CartProvider;
pub use store::{CartSnapshot, CartStore, Hydration};
pub use writer::PersistStatus;

pub use market_core::{AddRequest, CartChange, LineItem};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=market_cart=trace` - Show trace for the cart only
/// - Default: INFO, DEBUG for market crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,market_cart=debug,market_db=debug,sqlx=warn")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
