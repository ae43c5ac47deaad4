//! # Cart Error Types
//!
//! Errors a cart consumer can see.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Failure                        Surfaces as                             │
//! │  ─────────────────────────────  ─────────────────────────────────────   │
//! │  No store in the provider       OutsideProvider (returned to caller)    │
//! │  Snapshot unreadable at start   warn! log, cart stays empty             │
//! │  Snapshot write failed          error! log + PersistStatus, flush() Err │
//! │  Config file unreadable         Config (returned from CartConfig::load) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations (`add_to_cart`, `increment`, `decrement`) never return errors.

use market_core::CoreError;
use market_db::DbError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Wiring Errors
    // =========================================================================
    /// Cart state was requested without a store in scope.
    ///
    /// This is a wiring bug, not a transient failure. Don't retry.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// `CartStore::start` was called outside a Tokio runtime.
    #[error("Cart store requires a Tokio runtime: {0}")]
    NoRuntime(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// The latest snapshot write failed.
    #[error("Cart persistence failed: {0}")]
    Persistence(String),

    /// The writer task is gone, pending writes can't be confirmed.
    #[error("Cart writer has shut down")]
    WriterClosed,

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] CoreError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid or unreadable configuration.
    #[error("Invalid cart configuration: {0}")]
    Config(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_provider_message() {
        assert_eq!(
            CartError::OutsideProvider.to_string(),
            "use_cart must be used within a CartProvider"
        );
    }

    #[test]
    fn test_storage_error_converts() {
        let err: CartError = DbError::PoolExhausted.into();
        assert!(matches!(err, CartError::Storage(DbError::PoolExhausted)));
    }
}
